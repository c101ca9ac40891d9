//! Fault barrier helpers
//!
//! Shared by the dispatcher and the worker pool, both of which `catch_unwind`
//! to turn a panic payload into a readable message.

use std::any::Any;

/// Render a panic payload as text
///
/// `panic!("literal")` carries a `&'static str`, formatted panics carry a `String`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_str_payload() {
        let payload = std::panic::catch_unwind(|| panic!("static boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static boom");
    }

    #[test]
    fn test_formatted_payload() {
        let n = 3;
        let payload = std::panic::catch_unwind(|| panic!("boom {n}")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 3");
    }

    #[test]
    fn test_opaque_payload() {
        let payload = std::panic::catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
