use calc_core::calculator::{evaluate, CalcError, EvalError};
use std::thread;

#[test]
fn test_evaluate_from_many_threads() {
    let inputs = ["2+2*3", "(2+2)*3", "50%", "sqrt(16)", "10/0", "2**10"];

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(move || {
                (0..200)
                    .flat_map(|_| inputs.iter().map(|input| evaluate(input)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().unwrap();
        for chunk in results.chunks(inputs.len()) {
            assert_eq!(chunk[0], Ok(8.0));
            assert_eq!(chunk[1], Ok(12.0));
            assert_eq!(chunk[2], Ok(0.5));
            assert_eq!(chunk[3], Ok(4.0));
            assert_eq!(chunk[4], Err(CalcError::Eval(EvalError::DivisionByZero)));
            assert_eq!(chunk[5], Ok(1024.0));
        }
    }
}
