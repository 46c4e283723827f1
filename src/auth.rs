//! Credentials handed to the SMTP client when it authenticates.

use core::fmt;

/// An immutable username/password pair, as produced by a [`CredentialSource`].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Credential<'a> {
    username: &'a str,
    password: &'a str,
}

impl<'a> Credential<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self { username, password }
    }

    pub fn username(&self) -> &'a str {
        self.username
    }

    pub fn password(&self) -> &'a str {
        self.password
    }

    pub fn as_pair(&self) -> (&'a str, &'a str) {
        (self.username, self.password)
    }
}

impl fmt::Debug for Credential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Anything the client can ask for a credential when a connection authenticates.
///
/// The client calls [`authentication`](CredentialSource::authentication) once per connection,
/// after the EHLO exchange, so the returned pair always reflects the source's state at that point.
pub trait CredentialSource {
    fn authentication(&self) -> Credential<'_>;
}

impl CredentialSource for Credential<'_> {
    fn authentication(&self) -> Credential<'_> {
        *self
    }
}

impl<S: CredentialSource + ?Sized> CredentialSource for &S {
    #[inline]
    fn authentication(&self) -> Credential<'_> {
        (**self).authentication()
    }
}

/// Mutable holder of the username and password used to log in to a mail server.
///
/// No validation is done on either field. Empty strings stand for absent values and are passed
/// to the server as-is, which is then responsible for rejecting them.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CredentialProvider<'a> {
    username: &'a str,
    password: &'a str,
}

impl<'a> CredentialProvider<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self { username, password }
    }

    pub fn username(&self) -> &'a str {
        self.username
    }

    pub fn password(&self) -> &'a str {
        self.password
    }

    pub fn set_username(&mut self, username: &'a str) {
        self.username = username;
    }

    pub fn set_password(&mut self, password: &'a str) {
        self.password = password;
    }

    /// Snapshot of the current pair. It borrows the strings, not the provider, so it stays
    /// valid across later setter calls.
    pub fn authentication(&self) -> Credential<'a> {
        Credential::new(self.username, self.password)
    }
}

impl CredentialSource for CredentialProvider<'_> {
    fn authentication(&self) -> Credential<'_> {
        CredentialProvider::authentication(self)
    }
}

impl fmt::Debug for CredentialProvider<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
