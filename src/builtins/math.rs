//! libm-style math builtins.
//!
//! Unary functions take the piped input; the binary and ternary ones take
//! their operands as arguments and ignore the input, so `pow(2; 10)` works
//! from any context. Results keep the integer tag only when every operand
//! was an integer and the result is integral.

use super::{Function, Registry, ARGCOUNT0, ARGCOUNT2, ARGCOUNT3};
use crate::value::{Number, Value};

mod ffi {
    use libc::{c_double, c_int};

    #[cfg_attr(unix, link(name = "m"))]
    extern "C" {
        pub fn erf(x: c_double) -> c_double;
        pub fn erfc(x: c_double) -> c_double;
        pub fn tgamma(x: c_double) -> c_double;
        pub fn lgamma(x: c_double) -> c_double;
        pub fn j0(x: c_double) -> c_double;
        pub fn j1(x: c_double) -> c_double;
        pub fn jn(n: c_int, x: c_double) -> c_double;
        pub fn y0(x: c_double) -> c_double;
        pub fn y1(x: c_double) -> c_double;
        pub fn yn(n: c_int, x: c_double) -> c_double;
        pub fn frexp(x: c_double, exp: *mut c_int) -> c_double;
        pub fn ldexp(x: c_double, exp: c_int) -> c_double;
        pub fn logb(x: c_double) -> c_double;
        pub fn nextafter(x: c_double, y: c_double) -> c_double;
        pub fn remainder(x: c_double, y: c_double) -> c_double;
    }
}

pub fn register(registry: &mut Registry) {
    let unary: [(&'static str, fn(f64) -> f64); 38] = [
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("asin", f64::asin),
        ("acos", f64::acos),
        ("atan", f64::atan),
        ("sinh", f64::sinh),
        ("cosh", f64::cosh),
        ("tanh", f64::tanh),
        ("asinh", f64::asinh),
        ("acosh", f64::acosh),
        ("atanh", f64::atanh),
        ("floor", f64::floor),
        ("round", f64::round),
        // half away from zero, same as `round`
        ("rint", f64::round),
        ("ceil", f64::ceil),
        ("trunc", f64::trunc),
        ("fabs", f64::abs),
        ("sqrt", f64::sqrt),
        ("cbrt", f64::cbrt),
        ("exp", f64::exp),
        ("exp10", |x: f64| 10f64.powf(x)),
        ("exp2", f64::exp2),
        ("expm1", f64::exp_m1),
        ("log", f64::ln),
        ("log10", f64::log10),
        ("log1p", f64::ln_1p),
        ("log2", f64::log2),
        ("logb", logb),
        ("gamma", tgamma),
        ("tgamma", tgamma),
        ("lgamma", lgamma),
        ("erf", erf),
        ("erfc", erfc),
        ("j0", j0),
        ("j1", j1),
        ("y0", y0),
        ("y1", y1),
    ];
    for (name, f) in unary {
        registry.register(math0(name, f));
    }
    registry.register(Function::native("frexp", ARGCOUNT0, |_, v, _| {
        let x = v.to_float("frexp")?;
        let (m, e) = frexp(x);
        Ok(Value::array(vec![
            Value::Number(Number::sticky(m, v.is_int())),
            Value::int(e as i64),
        ]))
    }));
    registry.register(Function::native("modf", ARGCOUNT0, |_, v, _| {
        let x = v.to_float("modf")?;
        let (frac, int) = modf(x);
        Ok(Value::array(vec![
            Value::Number(Number::sticky(frac, v.is_int())),
            Value::Number(Number::sticky(int, v.is_int())),
        ]))
    }));

    let binary: [(&'static str, fn(f64, f64) -> f64); 17] = [
        ("atan2", f64::atan2),
        ("copysign", f64::copysign),
        ("drem", drem),
        ("fdim", fdim),
        ("fmax", f64::max),
        ("fmin", f64::min),
        ("fmod", |l: f64, r: f64| l % r),
        ("hypot", f64::hypot),
        ("jn", |n: f64, x: f64| unsafe { ffi::jn(n as libc::c_int, x) }),
        ("ldexp", |x: f64, e: f64| ldexp(x, e as i32)),
        ("nextafter", nextafter),
        ("nexttoward", nextafter),
        ("remainder", remainder),
        ("scalb", |x: f64, e: f64| x * 2f64.powf(e)),
        ("scalbln", |x: f64, e: f64| x * 2f64.powf(e)),
        ("yn", |n: f64, x: f64| unsafe { ffi::yn(n as libc::c_int, x) }),
        ("pow", f64::powf),
    ];
    for (name, f) in binary {
        registry.register(math2(name, f));
    }

    registry.register(math3("fma", |x: f64, y: f64, z: f64| x * y + z));
}

fn math0(name: &'static str, f: fn(f64) -> f64) -> Function {
    Function::native(name, ARGCOUNT0, move |_, v, _| {
        let x = v.to_float(name)?;
        Ok(Value::Number(Number::sticky(f(x), v.is_int())))
    })
}

fn math2(name: &'static str, f: fn(f64, f64) -> f64) -> Function {
    Function::native(name, ARGCOUNT2, move |_, _, args| {
        let (l, r) = (&args[0], &args[1]);
        let out = f(l.to_float(name)?, r.to_float(name)?);
        Ok(Value::Number(Number::sticky(out, l.is_int() && r.is_int())))
    })
}

fn math3(name: &'static str, f: fn(f64, f64, f64) -> f64) -> Function {
    Function::native(name, ARGCOUNT3, move |_, _, args| {
        let (x, y, z) = (&args[0], &args[1], &args[2]);
        let out = f(x.to_float(name)?, y.to_float(name)?, z.to_float(name)?);
        let ints = args.iter().all(Value::is_int);
        Ok(Value::Number(Number::sticky(out, ints)))
    })
}

// Safe wrappers; every libm function here is total over f64.

fn erf(x: f64) -> f64 {
    unsafe { ffi::erf(x) }
}

fn erfc(x: f64) -> f64 {
    unsafe { ffi::erfc(x) }
}

fn tgamma(x: f64) -> f64 {
    unsafe { ffi::tgamma(x) }
}

fn lgamma(x: f64) -> f64 {
    unsafe { ffi::lgamma(x) }
}

fn j0(x: f64) -> f64 {
    unsafe { ffi::j0(x) }
}

fn j1(x: f64) -> f64 {
    unsafe { ffi::j1(x) }
}

fn y0(x: f64) -> f64 {
    unsafe { ffi::y0(x) }
}

fn y1(x: f64) -> f64 {
    unsafe { ffi::y1(x) }
}

fn logb(x: f64) -> f64 {
    unsafe { ffi::logb(x) }
}

fn nextafter(x: f64, y: f64) -> f64 {
    unsafe { ffi::nextafter(x, y) }
}

fn remainder(x: f64, y: f64) -> f64 {
    unsafe { ffi::remainder(x, y) }
}

fn ldexp(x: f64, e: i32) -> f64 {
    unsafe { ffi::ldexp(x, e) }
}

fn frexp(x: f64) -> (f64, i32) {
    let mut e: libc::c_int = 0;
    let m = unsafe { ffi::frexp(x, &mut e) };
    (m, e)
}

/// `(fraction, integer)`; infinities split into a signed zero and themselves.
fn modf(x: f64) -> (f64, f64) {
    let int = x.trunc();
    let frac = if x.is_infinite() {
        0f64.copysign(x)
    } else {
        x - int
    };
    (frac, int)
}

/// `remainder`, but an exact zero takes the sign of the dividend.
fn drem(l: f64, r: f64) -> f64 {
    let x = remainder(l, r);
    if x == 0.0 {
        x.copysign(l)
    } else {
        x
    }
}

fn fdim(l: f64, r: f64) -> f64 {
    if l.is_nan() || r.is_nan() {
        f64::NAN
    } else if l > r {
        l - r
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::call;
    use crate::error::{CallError, CoreError};

    fn num(v: Value) -> f64 {
        v.as_number().unwrap().as_f64()
    }

    #[test]
    fn test_unary_keeps_integers() {
        let out = call("sqrt", &Value::int(16), &[]).unwrap();
        assert!(out.is_int());
        assert_eq!(out, Value::int(4));
        let out = call("sqrt", &Value::int(2), &[]).unwrap();
        assert!(!out.is_int());
        assert!((num(out) - std::f64::consts::SQRT_2).abs() < 1e-12);
        let out = call("floor", &Value::float(2.5), &[]).unwrap();
        assert!(!out.is_int());
        assert_eq!(out, Value::int(2));
    }

    #[test]
    fn test_unary_type_error() {
        let err = call("sin", &Value::from("x"), &[]).unwrap_err();
        assert!(matches!(err, CallError::Value(CoreError::Type { ref name, .. }) if name == "sin"));
        assert_eq!(err.to_string(), "sin cannot be applied to: string (\"x\")");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(call("round", &Value::float(2.5), &[]).unwrap(), Value::int(3));
        assert_eq!(call("round", &Value::float(-2.5), &[]).unwrap(), Value::int(-3));
        assert_eq!(call("rint", &Value::float(0.5), &[]).unwrap(), Value::int(1));
        assert_eq!(call("trunc", &Value::float(-1.7), &[]).unwrap(), Value::int(-1));
        assert_eq!(call("ceil", &Value::float(1.2), &[]).unwrap(), Value::int(2));
        assert_eq!(call("fabs", &Value::int(-3), &[]).unwrap(), Value::int(3));
    }

    #[test]
    fn test_special_functions() {
        assert_eq!(call("erf", &Value::int(0), &[]).unwrap(), Value::int(0));
        assert!((num(call("tgamma", &Value::int(5), &[]).unwrap()) - 24.0).abs() < 1e-9);
        assert!((num(call("gamma", &Value::float(0.5), &[]).unwrap()) - std::f64::consts::PI.sqrt()).abs() < 1e-12);
        assert!(num(call("lgamma", &Value::int(1), &[]).unwrap()).abs() < 1e-12);
        assert_eq!(call("j0", &Value::int(0), &[]).unwrap(), Value::int(1));
        assert_eq!(call("logb", &Value::int(8), &[]).unwrap(), Value::int(3));
        assert_eq!(call("exp10", &Value::int(2), &[]).unwrap(), Value::int(100));
    }

    #[test]
    fn test_frexp_modf() {
        let out = call("frexp", &Value::int(8), &[]).unwrap();
        assert_eq!(out, Value::array(vec![Value::float(0.5), Value::int(4)]));
        let out = call("frexp", &Value::int(0), &[]).unwrap();
        assert_eq!(out, Value::array(vec![Value::int(0), Value::int(0)]));
        let out = call("modf", &Value::float(3.5), &[]).unwrap();
        assert_eq!(out, Value::array(vec![Value::float(0.5), Value::float(3.0)]));
        let out = call("modf", &Value::float(f64::INFINITY), &[]).unwrap();
        assert_eq!(out, Value::array(vec![Value::float(0.0), Value::float(f64::INFINITY)]));
    }

    #[test]
    fn test_binary_ignores_input() {
        let out = call("pow", &Value::from("ignored"), &[Value::int(2), Value::int(10)]).unwrap();
        assert!(out.is_int());
        assert_eq!(out, Value::int(1024));
        assert_eq!(call("pow", &Value::Null, &[Value::int(2), Value::int(-1)]).unwrap(), Value::float(0.5));
        assert_eq!(call("ldexp", &Value::Null, &[Value::int(1), Value::int(3)]).unwrap(), Value::int(8));
        assert_eq!(call("scalb", &Value::Null, &[Value::int(3), Value::int(2)]).unwrap(), Value::int(12));
        assert_eq!(call("fmod", &Value::Null, &[Value::int(7), Value::int(3)]).unwrap(), Value::int(1));
        assert_eq!(call("fdim", &Value::Null, &[Value::int(2), Value::int(5)]).unwrap(), Value::int(0));
        assert_eq!(call("fmax", &Value::Null, &[Value::int(2), Value::float(5.5)]).unwrap(), Value::float(5.5));
        assert_eq!(call("jn", &Value::Null, &[Value::int(0), Value::int(0)]).unwrap(), Value::int(1));
        assert!(call("atan2", &Value::Null, &[Value::int(1), Value::Null]).is_err());
    }

    #[test]
    fn test_drem_sign() {
        assert_eq!(call("drem", &Value::Null, &[Value::int(5), Value::int(2)]).unwrap(), Value::int(1));
        let out = num(call("drem", &Value::Null, &[Value::float(-4.0), Value::int(2)]).unwrap());
        assert_eq!(out, 0.0);
        assert!(out.is_sign_negative());
        assert_eq!(call("remainder", &Value::Null, &[Value::int(7), Value::int(2)]).unwrap(), Value::int(-1));
    }

    #[test]
    fn test_nextafter() {
        let out = num(call("nextafter", &Value::Null, &[Value::int(1), Value::int(2)]).unwrap());
        assert!(out > 1.0 && out - 1.0 <= f64::EPSILON);
    }

    #[test]
    fn test_fma() {
        let out = call("fma", &Value::Null, &[Value::int(2), Value::int(3), Value::int(4)]).unwrap();
        assert!(out.is_int());
        assert_eq!(out, Value::int(10));
        let out = call("fma", &Value::Null, &[Value::float(0.5), Value::int(2), Value::int(1)]).unwrap();
        assert!(!out.is_int());
        assert_eq!(out, Value::int(2));
    }
}
