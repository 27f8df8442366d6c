/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 resource ID.
///
/// 53 bits total so the value survives a round-trip through JavaScript's
/// Number: 41 bits of milliseconds since a custom epoch, 12 random bits to
/// separate ids minted in the same millisecond (plenty at single-admin
/// scale).
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    const EPOCH_MS: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z
    const TS_MASK: i64 = (1 << 41) - 1;
    const RAND_BITS: u32 = 12;

    let ts = (now_millis() - EPOCH_MS) & TS_MASK;
    let salt = rand::thread_rng().gen_range(0..(1i64 << RAND_BITS));
    (ts << RAND_BITS) | salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_ids_are_time_ordered() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(b > a);
    }

    #[test]
    fn test_snowflake_fits_js_safe_integer() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id <= 0x1F_FFFF_FFFF_FFFF); // 2^53 - 1
    }
}
