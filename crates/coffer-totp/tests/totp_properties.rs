// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use coffer_totp::{Algorithm, TotpConfig};
use proptest::prelude::*;

const RFC_SHA1: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

#[test]
fn rfc_key_at_59_seconds() {
    let code = TotpConfig::new(RFC_SHA1).generate_code_at(59).unwrap();
    assert_eq!(code.code, "287082");
    assert_eq!(code.remaining_secs, 1);
}

#[test]
fn imported_uri_generates_expected_code() {
    let cfg = TotpConfig::parse_uri(&format!(
        "otpauth://totp/Example:alice@example.com?secret={RFC_SHA1}&issuer=Example"
    ))
    .unwrap();
    assert_eq!(cfg.generate_code_at(59).unwrap().code, "287082");
}

proptest! {
    #[test]
    fn codes_have_exact_width(time in 0u64..4_000_000_000, digits in 6u32..=8) {
        let cfg = TotpConfig { digits, ..TotpConfig::new(RFC_SHA1) };
        let code = cfg.generate_code_at(time).unwrap();
        prop_assert_eq!(code.code.len(), digits as usize);
        prop_assert!(code.code.bytes().all(|b| b.is_ascii_digit()));
        prop_assert!(code.remaining_secs >= 1 && code.remaining_secs <= 30);
    }

    #[test]
    fn one_step_tolerance_only(
        time in 120u64..4_000_000_000,
        algorithm in prop_oneof![Just(Algorithm::Sha1), Just(Algorithm::Sha256), Just(Algorithm::Sha512)],
    ) {
        let cfg = TotpConfig { algorithm, digits: 8, ..TotpConfig::new(RFC_SHA1) };
        let code = cfg.generate_code_at(time).unwrap().code;
        let period = cfg.period;

        prop_assert!(cfg.validate_at(&code, time + period));
        prop_assert!(cfg.validate_at(&code, time - period));

        // A collision with a neighbouring window's code would be a true
        // positive, so only assert rejection when the codes differ.
        for far in [time + 2 * period, time - 2 * period] {
            let window = far / period;
            let neighbours_differ = [window - 1, window, window + 1]
                .iter()
                .all(|w| cfg.generate_code_at(w * period).unwrap().code != code);
            if neighbours_differ {
                prop_assert!(!cfg.validate_at(&code, far));
            }
        }
    }
}
