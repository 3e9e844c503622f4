//! Script tokenizing.
//!
//! However tokens are separated (commas, spaces, newlines, or runs of
//! them), the script yields exactly the tokens in order.

use proptest::prelude::*;

use coverflow_sim::script::parse_script;

fn arb_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("go()".to_string()),
        Just("left()".to_string()),
        Just("right()".to_string()),
        "[a-z]{1,8}\\(\\)",
    ]
}

fn arb_separator() -> impl Strategy<Value = String> {
    "[, \n\t]{1,3}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn tokens_survive_any_separator(
        tokens in prop::collection::vec(arb_token(), 1..8),
        separators in prop::collection::vec(arb_separator(), 8),
        leading in arb_separator(),
    ) {
        let mut script = leading;
        for (token, sep) in tokens.iter().zip(&separators) {
            script.push_str(token);
            script.push_str(sep);
        }
        prop_assert_eq!(parse_script(&script), tokens);
    }
}
