use std::time::{SystemTime, UNIX_EPOCH};

use ensemble_core::{check_arity, register_fn, EnsembleError, Namespace, Value};

use crate::number_arg;

fn fold(args: &[Value], init: f64, op: fn(f64, f64) -> f64) -> Result<Value, EnsembleError> {
    let mut acc = init;
    for arg in args {
        acc = op(acc, number_arg(arg)?);
    }
    Ok(Value::number(acc))
}

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "+", |args| fold(args, 0.0, |a, b| a + b));

    register_fn(ns, "*", |args| fold(args, 1.0, |a, b| a * b));

    register_fn(ns, "-", |args| {
        check_arity!(args, "-", 1..);
        let first = number_arg(&args[0])?;
        if args.len() == 1 {
            return Ok(Value::number(-first));
        }
        fold(&args[1..], first, |a, b| a - b)
    });

    // IEEE division: dividing by zero yields an infinity or NaN
    register_fn(ns, "/", |args| {
        check_arity!(args, "/", 1..);
        let first = number_arg(&args[0])?;
        if args.len() == 1 {
            return Ok(Value::number(1.0 / first));
        }
        fold(&args[1..], first, |a, b| a / b)
    });

    register_fn(ns, "time-ms", |args| {
        check_arity!(args, "time-ms", 0);
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| EnsembleError::eval(format!("time-ms: {e}")))?;
        Ok(Value::number(elapsed.as_millis() as f64))
    });
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, n};
    use ensemble_core::EnsembleError;

    #[test]
    fn variadic_sum_and_product() {
        assert_eq!(call("+", &[]).unwrap(), n(0.0));
        assert_eq!(call("+", &[n(1.0), n(2.0), n(3.5)]).unwrap(), n(6.5));
        assert_eq!(call("*", &[n(2.0), n(3.0), n(4.0)]).unwrap(), n(24.0));
    }

    #[test]
    fn subtraction_folds_left() {
        assert_eq!(call("-", &[n(10.0), n(3.0), n(2.0)]).unwrap(), n(5.0));
        assert_eq!(call("-", &[n(4.0)]).unwrap(), n(-4.0));
        assert!(matches!(call("-", &[]), Err(EnsembleError::Arity { .. })));
    }

    #[test]
    fn division() {
        assert_eq!(call("/", &[n(12.0), n(3.0), n(2.0)]).unwrap(), n(2.0));
        assert_eq!(call("/", &[n(4.0)]).unwrap(), n(0.25));
        assert_eq!(call("/", &[n(1.0), n(0.0)]).unwrap(), n(f64::INFINITY));
    }

    #[test]
    fn non_number_is_type_error() {
        let err = call("+", &[n(1.0), ensemble_core::Value::string("2")]).unwrap_err();
        assert!(matches!(err, EnsembleError::Type { .. }));
    }

    #[test]
    fn time_ms_is_positive() {
        let t = call("time-ms", &[]).unwrap().as_number().unwrap();
        assert!(t > 0.0);
    }
}
