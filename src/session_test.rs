use super::*;

fn ctx(name: &str, role: AccountRole) -> SessionContext {
    SessionContext::new("u-1", name, role)
}

// =============================================================================
// SessionContext
// =============================================================================

#[test]
fn with_token_sets_token() {
    let session = ctx("Ana", AccountRole::Corretor).with_token("tok-1");
    assert_eq!(session.token.as_deref(), Some("tok-1"));
}

#[test]
fn new_has_no_token() {
    assert_eq!(ctx("Ana", AccountRole::Corretor).token, None);
}

// =============================================================================
// SessionStore
// =============================================================================

#[test]
fn current_returns_initial_value() {
    let store = SessionStore::new(ctx("Ana", AccountRole::Particular));
    assert_eq!(store.current().name, "Ana");
}

#[tokio::test]
async fn update_broadcasts_to_subscribers() {
    let store = SessionStore::new(ctx("Ana", AccountRole::Particular));
    let mut rx = store.subscribe();

    store.update(ctx("Imobiliária Sul", AccountRole::Imobiliaria));

    rx.changed().await.expect("store alive");
    assert_eq!(rx.borrow().role, AccountRole::Imobiliaria);
    assert_eq!(store.current().name, "Imobiliária Sul");
}

#[test]
fn update_without_subscribers_does_not_panic() {
    let store = SessionStore::new(ctx("Ana", AccountRole::Particular));
    store.update(ctx("Bruno", AccountRole::Corretor));
    assert_eq!(store.current().name, "Bruno");
}
