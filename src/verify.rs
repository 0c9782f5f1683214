//! Result checking against a reference ciphertext
//!
//! A mismatch is reported, never raised as an error.

use core::fmt;

use log::{info, warn};

use crate::block::{Ciphertext, Key, Plaintext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self == Self::Pass
    }
}

fn compare(computed: &Ciphertext, expected: &Ciphertext) -> Verdict {
    if computed.as_bytes() == expected.as_bytes() {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}

/// Compare all 16 bytes of `computed` against `expected`
pub fn verify(computed: &Ciphertext, expected: &Ciphertext) -> Verdict {
    let verdict = compare(computed, expected);
    match verdict {
        Verdict::Pass => info!("Ciphertext matches expected value"),
        Verdict::Fail => warn!("Ciphertext mismatch: got {computed}, expected {expected}"),
    }
    verdict
}

/// Everything shown to the user after one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub key: Key,
    pub plaintext: Plaintext,
    pub computed: Ciphertext,
    pub expected: Ciphertext,
}

impl Report {
    pub fn new(key: Key, plaintext: Plaintext, computed: Ciphertext, expected: Ciphertext) -> Self {
        Self {
            key,
            plaintext,
            computed,
            expected,
        }
    }

    pub fn verdict(&self) -> Verdict {
        verify(&self.computed, &self.expected)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key:        {}", self.key)?;
        writeln!(f, "Plaintext:  {}", self.plaintext)?;
        writeln!(f)?;
        writeln!(f, "Ciphertext: {}", self.computed)?;
        writeln!(f, "Expected:   {}", self.expected)?;
        writeln!(f)?;
        match compare(&self.computed, &self.expected) {
            Verdict::Pass => write!(f, "Success!"),
            Verdict::Fail => write!(f, "Bummer.  Test failed"),
        }
    }
}
