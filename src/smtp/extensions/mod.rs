pub mod auth;

use enumset::{EnumSet, EnumSetType};

/// Enum containing all SMTP extension flags the client understands.
#[derive(EnumSetType, Debug)]
pub enum SmtpExtension {
    AuthPlain,
    AuthLogin,
}

impl SmtpExtension {
    /// Extension flags announced by one EHLO keyword line, e.g. `AUTH PLAIN LOGIN XOAUTH2`.
    /// Unknown keywords and mechanisms are ignored.
    pub fn parse_ehlo_line(line: &str) -> EnumSet<Self> {
        let mut words = line.split_ascii_whitespace();

        match words.next() {
            Some(keyword) if keyword.eq_ignore_ascii_case("AUTH") => words
                .filter_map(|mech| {
                    if mech.eq_ignore_ascii_case("PLAIN") {
                        Some(Self::AuthPlain)
                    } else if mech.eq_ignore_ascii_case("LOGIN") {
                        Some(Self::AuthLogin)
                    } else {
                        None
                    }
                })
                .collect(),
            _ => EnumSet::empty(),
        }
    }
}

/// What the server announced in its EHLO reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EhloInfo {
    pub extensions: EnumSet<SmtpExtension>,
}
