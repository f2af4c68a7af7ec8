//! Aegis Redaction Engine
//!
//! Strips personal and financial identifiers from message text before it
//! leaves the client.
//!
//! # Rules
//!
//! Applied strictly in this order, each a global replacement:
//!
//! | # | Rule      | Matches                                      | Token           |
//! |---|-----------|----------------------------------------------|-----------------|
//! | 1 | `email`   | email addresses                              | `{{EMAIL_ID}}`  |
//! | 2 | `phone`   | `+254` / `0` prefix, `7` or `1`, 8 digits    | `{{PHONE_ID}}`  |
//! | 3 | `money`   | `Ksh`, `KES`, `Sh`, `USD`, `$`, `€` amounts, `n/=` | `{{MONEY_VAL}}` |
//! | 4 | `gov_id`  | KRA PIN (letter, 9 digits, letter)           | `{{GOV_ID}}`    |
//! | 5 | `account` | bare 8-16 digit runs                         | `{{ACC_NUM}}`   |
//!
//! The order runs from narrow to broad. Tokens contain no digits, so once a
//! span has been replaced the later rules cannot see it.
//!
//! # Examples
//!
//! ```
//! use aegis_redact::RedactionEngine;
//!
//! let engine = RedactionEngine::standard();
//! assert_eq!(
//!     engine.redact("Pay Ksh. 50,000 to acc 1234567890123"),
//!     "Pay {{MONEY_VAL}} to acc {{ACC_NUM}}"
//! );
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
mod rule;

pub use engine::{redact, RedactionEngine, RedactionReport, RuleCount};
pub use error::RedactError;
pub use rule::{
    standard_rules, PatternRule, ACCOUNT_TOKEN, EMAIL_TOKEN, GOV_ID_TOKEN, MONEY_TOKEN,
    PHONE_TOKEN,
};
