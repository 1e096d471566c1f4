use crate::error::{Error, Result};

/// Split a payload into `N` trimmed comma-separated fields. The last field
/// takes the remainder, commas included.
pub fn fields<const N: usize>(payload: &str) -> Result<[&str; N]> {
    let mut out = [""; N];
    let mut parts = payload.splitn(N, ',');
    for slot in out.iter_mut() {
        *slot = parts.next().ok_or(Error::BadFormat)?.trim();
    }
    Ok(out)
}

/// Split a fixed-width record into exactly `N` trimmed fields.
pub fn exact_fields<const N: usize>(payload: &str) -> Result<[&str; N]> {
    let parts: [&str; N] = payload
        .split(',')
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| Error::BadFieldCount)?;
    Ok(parts.map(str::trim))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_fields() {
        assert_eq!(fields::<3>(" a, NA-1 ,c").unwrap(), ["a", "NA-1", "c"]);
        assert_eq!(fields::<2>("a,b,c").unwrap(), ["a", "b,c"]);
        assert_eq!(fields::<1>("").unwrap(), [""]);
        assert!(matches!(fields::<3>("a,b"), Err(Error::BadFormat)));
        assert!(matches!(fields::<2>(""), Err(Error::BadFormat)));
    }

    #[test]
    fn exact() {
        assert_eq!(exact_fields::<3>("a, b,c ").unwrap(), ["a", "b", "c"]);
        assert_eq!(exact_fields::<3>("a,,c").unwrap(), ["a", "", "c"]);
        assert!(matches!(exact_fields::<3>("a,b"), Err(Error::BadFieldCount)));
        assert!(matches!(exact_fields::<3>("a,b,c,d"), Err(Error::BadFieldCount)));
    }
}
