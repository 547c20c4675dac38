//! Canonical text for numbers and addresses.

use std::fmt::Write;

use crate::render::NIL;

/// Writes a signed integer in base 10.
#[inline]
pub fn write_int(out: &mut String, v: i64) {
    let _ = write!(out, "{v}");
}

/// Writes an unsigned integer in base 10.
#[inline]
pub fn write_uint(out: &mut String, v: u64) {
    let _ = write!(out, "{v}");
}

/// Writes a 32-bit float with the shortest digits that round-trip at 32 bits.
pub fn write_f32(out: &mut String, v: f32) {
    if !write_special(out, v.into()) {
        write_shortest(out, &format!("{v:e}"));
    }
}

/// Writes a 64-bit float with the shortest digits that round-trip at 64 bits.
pub fn write_f64(out: &mut String, v: f64) {
    if !write_special(out, v) {
        write_shortest(out, &format!("{v:e}"));
    }
}

/// Writes a complex number as `(re+imi)` using 32-bit parts.
pub fn write_complex64(out: &mut String, re: f32, im: f32) {
    let mut im_text = String::new();
    write_f32(&mut im_text, im);
    out.push('(');
    write_f32(out, re);
    push_imaginary(out, &im_text);
}

/// Writes a complex number as `(re+imi)` using 64-bit parts.
pub fn write_complex128(out: &mut String, re: f64, im: f64) {
    let mut im_text = String::new();
    write_f64(&mut im_text, im);
    out.push('(');
    write_f64(out, re);
    push_imaginary(out, &im_text);
}

fn push_imaginary(out: &mut String, im_text: &str) {
    if !im_text.starts_with(['+', '-']) {
        out.push('+');
    }
    out.push_str(im_text);
    out.push_str("i)");
}

/// Writes an address as `0x`-prefixed lowercase hex, or `<nil>` for zero.
pub fn write_hex_ptr(out: &mut String, addr: usize) {
    if addr == 0 {
        out.push_str(NIL);
        return;
    }
    let _ = write!(out, "{addr:#x}");
}

/// Handles NaN and the infinities. Returns false for finite values.
fn write_special(out: &mut String, v: f64) -> bool {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v == f64::INFINITY {
        out.push_str("+Inf");
    } else if v == f64::NEG_INFINITY {
        out.push_str("-Inf");
    } else {
        return false;
    }
    true
}

/// Rewrites Rust's shortest scientific form (`-1.25e-7`) into the canonical
/// form: exponent notation only when the exponent is below -4 or at least 6.
fn write_shortest(out: &mut String, sci: &str) {
    let (neg, body) = match sci.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, sci),
    };
    let (mantissa, exp) = body.split_once('e').unwrap_or((body, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if neg {
        out.push('-');
    }

    if exp < -4 || exp >= 6 {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        let _ = write!(out, "{:02}", exp.unsigned_abs());
        return;
    }

    // Number of digits before the decimal point.
    let dp = exp + 1;
    if dp <= 0 {
        out.push_str("0.");
        for _ in 0..-dp {
            out.push('0');
        }
        out.push_str(&digits);
    } else if dp as usize >= digits.len() {
        out.push_str(&digits);
        for _ in digits.len()..dp as usize {
            out.push('0');
        }
    } else {
        let (int, frac) = digits.split_at(dp as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    }
}
