// ============================================================================
// src/util/input.rs – password and salt acquisition for the CLI
// ============================================================================

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::Password;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use zeroize::Zeroizing;

/// Where the password comes from. Never from argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSource {
    Env(String),
    Stdin,
    Prompt { confirm: bool },
}

/// Where the salt comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaltSource<'a> {
    Text(&'a str),
    Hex(&'a str),
    File(&'a Path),
}

pub fn read_password(source: &PasswordSource) -> Result<Zeroizing<Vec<u8>>> {
    match source {
        PasswordSource::Env(var) => {
            let value = std::env::var_os(var)
                .ok_or_else(|| anyhow!("password variable {var} is not set"))?;
            Ok(Zeroizing::new(value.into_encoded_bytes()))
        }
        PasswordSource::Stdin => {
            let mut line = Zeroizing::new(String::new());
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("read password from stdin")?;
            Ok(Zeroizing::new(strip_line_ending(&line).as_bytes().to_vec()))
        }
        PasswordSource::Prompt { confirm } => {
            let mut prompt = Password::new()
                .with_prompt("Password")
                .allow_empty_password(true);
            if *confirm {
                prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
            }
            let pw = Zeroizing::new(prompt.interact().context("read password from terminal")?);
            Ok(Zeroizing::new(pw.as_bytes().to_vec()))
        }
    }
}

pub fn read_salt(source: &SaltSource<'_>) -> Result<Vec<u8>> {
    match source {
        SaltSource::Text(s) => Ok(s.as_bytes().to_vec()),
        SaltSource::Hex(h) => decode_hex(h),
        SaltSource::File(path) => {
            fs::read(path).with_context(|| format!("read salt file {}", path.display()))
        }
    }
}

/// Decode hex, ignoring whitespace and `:` separators.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if cleaned.len() % 2 != 0 {
        bail!("hex salt has odd length ({} digits)", cleaned.len());
    }
    hex::decode(&cleaned).context("decode hex salt")
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_salt_is_used_verbatim() {
        let salt = read_salt(&SaltSource::Text("fbb2bb")).unwrap();
        assert_eq!(salt, b"fbb2bb");
    }

    #[test]
    fn hex_salt_tolerates_separators() {
        let salt = read_salt(&SaltSource::Hex("de:ad be\nef")).unwrap();
        assert_eq!(salt, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn odd_hex_rejected() {
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn salt_file_read_as_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salt.bin");
        fs::write(&path, [0u8, 1, 2, 255]).unwrap();
        assert_eq!(
            read_salt(&SaltSource::File(&path)).unwrap(),
            vec![0, 1, 2, 255]
        );
    }

    #[test]
    fn line_endings_stripped_once() {
        assert_eq!(strip_line_ending("pw\n"), "pw");
        assert_eq!(strip_line_ending("pw\r\n"), "pw");
        assert_eq!(strip_line_ending("pw \n\n"), "pw \n");
        assert_eq!(strip_line_ending("pw"), "pw");
    }

    #[test]
    fn env_password_missing_is_an_error() {
        let err = read_password(&PasswordSource::Env(
            "PBKDF2_FORGE_TEST_SURELY_UNSET".into(),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("PBKDF2_FORGE_TEST_SURELY_UNSET"));
    }
}
