//! Small pure helpers served next to the record API.

use crate::errors::ServiceError;

/// `n!`; anything at or below zero is 1.
pub fn factorial(n: i64) -> Result<u64, ServiceError> {
    if n <= 0 {
        return Ok(1);
    }
    (1..=n as u64).try_fold(1u64, |acc, x| {
        acc.checked_mul(x)
            .ok_or_else(|| ServiceError::Validation(format!("factorial of {n} does not fit in 64 bits")))
    })
}

/// Fibonacci numbers not greater than `n`, always starting with 0.
pub fn fibonacci_upto(n: i64) -> Vec<u64> {
    let mut out = vec![0];
    if n < 1 {
        return out;
    }
    let limit = n as u64;
    let (mut a, mut b) = (0u64, 1u64);
    while b <= limit {
        out.push(b);
        let next = a + b;
        a = b;
        b = next;
    }
    out
}

/// Trial division up to `sqrt(n)`.
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    let n = n as u64;
    let mut x = 2u64;
    while x.saturating_mul(x) <= n {
        if n % x == 0 {
            return false;
        }
        x += 1;
    }
    true
}

/// Lowercase hex MD5 of the UTF-8 bytes.
pub fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}
