use crate::error::WalletError;

/// Parse a user-entered decimal amount into base units.
///
/// `decimals` is the token's precision (6 for native TRX). Rejects
/// zero, negative, malformed, and excess-precision amounts with
/// `WalletError::InvalidAmount`; the chain remains the final arbiter
/// of spendability.
pub fn parse_amount(input: &str, decimals: u8) -> Result<u64, WalletError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(WalletError::InvalidAmount("empty amount".to_string()));
    }
    if s.starts_with('-') {
        return Err(WalletError::InvalidAmount(format!(
            "negative amount: {}",
            s
        )));
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(WalletError::InvalidAmount(format!("malformed amount: {}", s)));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(WalletError::InvalidAmount(format!("malformed amount: {}", s)));
    }
    if frac_part.len() > decimals as usize {
        return Err(WalletError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            s, decimals
        )));
    }

    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(|| WalletError::InvalidAmount("precision too large".to_string()))?;

    let int_value: u64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| WalletError::InvalidAmount(format!("amount too large: {}", s)))?
    };

    // Right-pad the fractional digits to full precision.
    let frac_value: u64 = if frac_part.is_empty() {
        0
    } else {
        let padded: u64 = frac_part
            .parse()
            .map_err(|_| WalletError::InvalidAmount(format!("amount too large: {}", s)))?;
        padded * 10u64.pow((decimals as usize - frac_part.len()) as u32)
    };

    let value = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| WalletError::InvalidAmount(format!("amount too large: {}", s)))?;

    if value == 0 {
        return Err(WalletError::InvalidAmount("amount must be positive".to_string()));
    }

    Ok(value)
}

/// Format base units back into a decimal string for display.
pub fn format_amount(value: u64, decimals: u8) -> String {
    let scale = 10u64.pow(decimals as u32);
    let int_part = value / scale;
    let frac_part = value % scale;
    if frac_part == 0 {
        int_part.to_string()
    } else {
        let frac = format!("{:0width$}", frac_part, width = decimals as usize);
        format!("{}.{}", int_part, frac.trim_end_matches('0'))
    }
}
