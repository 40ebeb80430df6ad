use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^\w+([-+.]\w+)*@\w+([-.]\w+)*\.\w+([-.]\w+)*$").unwrap();
    // `regex` has no look-around: charset/length plus one presence check per class.
    static ref PASSWORD_CHARSET_RE: Regex = Regex::new(r"^[A-Za-z\d$@!%*#?&]{8,72}$").unwrap();
    static ref HAS_LETTER_RE: Regex = Regex::new(r"[A-Za-z]").unwrap();
    static ref HAS_DIGIT_RE: Regex = Regex::new(r"\d").unwrap();
    static ref HAS_SYMBOL_RE: Regex = Regex::new(r"[$@!%*#?&]").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least one letter, one digit and one of `$@!%*#?&`, 8 to 72 characters, nothing else.
pub(crate) fn is_valid_password(password: &str) -> bool {
    PASSWORD_CHARSET_RE.is_match(password)
        && HAS_LETTER_RE.is_match(password)
        && HAS_DIGIT_RE.is_match(password)
        && HAS_SYMBOL_RE.is_match(password)
}
