use anyhow::{Result, anyhow};
use std::fmt::Display;
use std::str::FromStr;

/// A tradeable unit on the ledger: the native lumen or an issued credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Native,
    Credit { code: String, issuer: String },
}

impl Asset {
    pub fn credit(code: &str, issuer: &str) -> Self {
        Asset::Credit {
            code: code.to_string(),
            issuer: issuer.to_string(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Asset::Native => "XLM",
            Asset::Credit { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<&str> {
        match self {
            Asset::Native => None,
            Asset::Credit { issuer, .. } => Some(issuer),
        }
    }

    /// Horizon's `asset_type` for this asset.
    pub fn asset_type(&self) -> &'static str {
        match self {
            Asset::Native => "native",
            Asset::Credit { code, .. } if code.len() <= 4 => "credit_alphanum4",
            Asset::Credit { .. } => "credit_alphanum12",
        }
    }

    /// Short label for tables and logs, e.g. `yXLM:GARDNV3`.
    pub fn short_label(&self) -> String {
        match self {
            Asset::Native => "XLM".to_string(),
            Asset::Credit { code, issuer } => {
                format!("{code}:{}", issuer.get(..7).unwrap_or(issuer))
            }
        }
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Credit { code, issuer } => write!(f, "{code}:{issuer}"),
        }
    }
}

impl FromStr for Asset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") || s.eq_ignore_ascii_case("xlm") {
            return Ok(Asset::Native);
        }

        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid asset '{}': expected CODE:ISSUER or native", s))?;
        if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(anyhow!("Invalid asset code '{}'", code));
        }
        if issuer.is_empty() {
            return Err(anyhow!("Missing issuer for asset '{}'", code));
        }
        Ok(Asset::credit(code, issuer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC_ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    #[test]
    fn test_parse_native() {
        assert_eq!("native".parse::<Asset>().unwrap(), Asset::Native);
        assert_eq!("XLM".parse::<Asset>().unwrap(), Asset::Native);
    }

    #[test]
    fn test_parse_credit() {
        let asset: Asset = format!("USDC:{USDC_ISSUER}").parse().unwrap();
        assert_eq!(asset.code(), "USDC");
        assert_eq!(asset.issuer(), Some(USDC_ISSUER));
        assert_eq!(asset.asset_type(), "credit_alphanum4");
        assert_eq!(asset.to_string(), format!("USDC:{USDC_ISSUER}"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("USDC".parse::<Asset>().is_err());
        assert!(":ISSUER".parse::<Asset>().is_err());
        assert!("USDC:".parse::<Asset>().is_err());
        assert!("TOOLONGASSETCODE:ISSUER".parse::<Asset>().is_err());
    }

    #[test]
    fn test_long_codes_are_alphanum12() {
        assert_eq!(
            Asset::credit("yUSDC", USDC_ISSUER).asset_type(),
            "credit_alphanum12"
        );
    }

    #[test]
    fn test_short_label() {
        assert_eq!(Asset::Native.short_label(), "XLM");
        assert_eq!(
            Asset::credit("USDC", USDC_ISSUER).short_label(),
            "USDC:GA5ZSEJ"
        );
    }
}
