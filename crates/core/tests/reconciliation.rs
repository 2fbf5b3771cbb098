//! End-to-end tests for the username cache: registration writes the cookie,
//! the login page reconciles against it, the server resolves the login name.
//!
//! No network I/O: cookies are exchanged as plain header strings.

use std::collections::HashSet;

use usertag_core::config::AppConfig;
use usertag_core::cookie::{find_cookie, SetCookie};
use usertag_core::identity::{lookup, matches, reconcile, DiscriminatorAllocator, UsernameMapping};
use usertag_core::login::{resolve_login_username, LoginForm, LoginTarget};

// ===========================================================================
// Helpers
// ===========================================================================

fn mapping_of(entries: &[(&str, &str)]) -> String {
    let mut mapping = UsernameMapping::new();
    for (base, full) in entries {
        mapping.insert(base, full);
    }
    mapping.encode().unwrap()
}

/// Turn a `Set-Cookie` header into the `Cookie` header the browser sends back.
fn echo_cookie(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

// ===========================================================================
// Reconciliation properties
// ===========================================================================

#[test]
fn present_base_reconciles_to_its_full_username() {
    let entries = [
        ("alice", "alice#7421"),
        ("bob", "Bob#0003"),
        ("élodie", "Élodie#0100"),
    ];
    let blob = mapping_of(&entries);

    for (base, full) in entries {
        assert_eq!(reconcile(&blob, base).as_deref(), Some(full));
        assert_eq!(reconcile(&blob, &base.to_uppercase()).as_deref(), Some(full));
    }
}

#[test]
fn absent_base_reconciles_to_nothing() {
    let blob = mapping_of(&[("alice", "alice#7421")]);
    for base in ["bob", "alic", "alice#7421", "al ice"] {
        assert_eq!(reconcile(&blob, base), None, "{base}");
    }
}

#[test]
fn matches_requires_separator() {
    for (base, full) in [("alice", "alice"), ("", "alice"), ("x", ""), ("bob", "bob 7421")] {
        assert!(!matches(base, full));
    }
}

#[test]
fn matches_compares_base_case_insensitively() {
    assert!(matches("Alice", "alice#7421"));
    assert!(!matches("bob", "alice#7421"));
}

#[test]
fn malformed_blobs_never_fault() {
    for blob in ["not-json", "[1,2]", "%", "%7B", "{\"a\":[\"a#1\"]}", "\u{0}"] {
        assert_eq!(lookup(blob, "a"), None);
        assert_eq!(reconcile(blob, "a"), None);
    }
}

#[test]
fn uppercase_input_reconciles() {
    assert_eq!(
        reconcile(r#"{"alice":"alice#7421"}"#, "ALICE").as_deref(),
        Some("alice#7421")
    );
}

#[test]
fn tampered_entry_fails_the_match_check() {
    let blob = r#"{"alice":"bob#1111"}"#;
    assert_eq!(lookup(blob, "alice").as_deref(), Some("bob#1111"));
    assert_eq!(reconcile(blob, "alice"), None);
}

// ===========================================================================
// Registration -> login round trip
// ===========================================================================

#[test]
fn registration_cookie_drives_next_login() {
    let config = AppConfig::default();
    let allocator = DiscriminatorAllocator::new(&config.accounts);

    // Two accounts named "sam" already exist.
    let taken: HashSet<u16> = [1, 2].into_iter().collect();
    let discriminator = allocator.allocate("Sam", &taken).unwrap();
    assert!(!taken.contains(&discriminator));
    let full = allocator.full_username("Sam", discriminator);

    // The registration response stores it next to an older entry.
    let request = format!("full_usernames={}", mapping_of(&[("kim", "kim#0042")]));
    let set_cookie = SetCookie::remember(&config.cookie, Some(&request), "Sam", &full)
        .unwrap()
        .header_value();

    // Next visit: the browser sends it back.
    let cookie_header = echo_cookie(&set_cookie);
    let blob = find_cookie(&cookie_header, &config.cookie.name).unwrap();

    let mut form = LoginForm::new("sam");
    assert!(form.on_submit(Some(blob)));
    assert_eq!(form.confirmed_full_username(), full);

    assert_eq!(
        LoginTarget::resolve(&config.accounts, form.username(), form.confirmed_full_username(), Some(blob)),
        LoginTarget::User(full.clone())
    );

    // Typing someone else's name clears the confirmation; the server then
    // falls back to the cookie for that name.
    form.on_username_input("kim");
    assert_eq!(form.confirmed_full_username(), "");
    assert!(!form.on_submit(Some("garbage")));
    assert_eq!(resolve_login_username(form.username(), "", Some(blob)), "kim#0042");
}
