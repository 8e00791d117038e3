//! Stellar account ids (StrKey encoded ed25519 public keys).

use super::error::HistoryError;
use std::fmt::Display;
use std::str::FromStr;

const ACCOUNT_ID_LEN: usize = 56;
const DECODED_LEN: usize = 35;
const ED25519_PUBLIC_KEY_VERSION: u8 = 6 << 3;
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// A validated public account address, in the form `G...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| HistoryError::InvalidAccount {
            account: s.to_string(),
            reason: reason.to_string(),
        };

        let account = s.trim();
        if account.is_empty() {
            return Err(invalid("account id is empty"));
        }
        if account.len() != ACCOUNT_ID_LEN {
            return Err(invalid("must be 56 characters long"));
        }

        let decoded = decode_base32(account).ok_or_else(|| invalid("not valid base32"))?;
        if decoded[0] != ED25519_PUBLIC_KEY_VERSION {
            return Err(invalid("not a public account address (expected 'G...')"));
        }

        let (payload, checksum) = decoded.split_at(DECODED_LEN - 2);
        let expected = u16::from_le_bytes([checksum[0], checksum[1]]);
        if crc16_xmodem(payload) != expected {
            return Err(invalid("checksum mismatch"));
        }

        Ok(AccountId(account.to_string()))
    }
}

fn decode_base32(input: &str) -> Option<[u8; DECODED_LEN]> {
    let mut out = [0u8; DECODED_LEN];
    let mut buffer: u32 = 0;
    let mut bits = 0;
    let mut index = 0;

    for c in input.bytes() {
        let value = BASE32_ALPHABET.iter().position(|a| *a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            *out.get_mut(index)? = (buffer >> bits) as u8;
            buffer &= (1 << bits) - 1;
            index += 1;
        }
    }

    (index == DECODED_LEN && bits == 0).then_some(out)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
    const USDC_ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    #[test]
    fn test_valid_accounts() {
        for account in [
            ZERO_ACCOUNT,
            USDC_ISSUER,
            "GAAACAQDAQCQMBYIBEFAWDANBYHRAEISCMKBKFQXDAMRUGY4DUPB7JZX",
        ] {
            let id: AccountId = account.parse().unwrap();
            assert_eq!(id.as_str(), account);
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let id: AccountId = format!("  {USDC_ISSUER}\n").parse().unwrap();
        assert_eq!(id.to_string(), USDC_ISSUER);
    }

    #[test]
    fn test_empty_account_is_rejected() {
        let err = "".parse::<AccountId>().unwrap_err();
        assert!(err.to_string().contains("account id is empty"));
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let err = "GABC".parse::<AccountId>().unwrap_err();
        assert!(err.to_string().contains("56 characters"));
    }

    #[test]
    fn test_lowercase_is_rejected() {
        let err = USDC_ISSUER
            .to_lowercase()
            .parse::<AccountId>()
            .unwrap_err();
        assert!(err.to_string().contains("base32"));
    }

    #[test]
    fn test_secret_seed_is_rejected() {
        let err = "SAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSU2"
            .parse::<AccountId>()
            .unwrap_err();
        assert!(err.to_string().contains("expected 'G...'"));
    }

    #[test]
    fn test_checksum_mismatch_is_rejected() {
        let mut tampered = USDC_ISSUER.to_string();
        tampered.replace_range(55..56, "M");
        let err = tampered.parse::<AccountId>().unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }
}
