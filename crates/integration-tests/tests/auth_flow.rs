//! End-to-end auth flows: registration, login, expiry, restart.

use chrono::Duration;
use vitrine_core::Role;
use vitrine_integration_tests::{TestContext, secret};
use vitrine_store::services::auth::AuthError;
use vitrine_store::services::users::UserError;

#[test]
fn test_register_login_logout() {
    let ctx = TestContext::new();
    let user = ctx.register("Ana Souza", "ana@example.com", Role::Client);

    let signed_in = ctx
        .state
        .auth()
        .login("ana@example.com", &secret("Senha123"))
        .unwrap();
    assert_eq!(signed_in.id, user.id);
    assert!(ctx.state.auth().is_logged_in().unwrap());

    ctx.state.auth().logout().unwrap();
    assert!(!ctx.state.auth().is_logged_in().unwrap());
}

#[test]
fn test_login_failures_do_not_reveal_accounts() {
    let ctx = TestContext::new();
    ctx.register("Ana Souza", "ana@example.com", Role::Client);

    let wrong_password = ctx
        .state
        .auth()
        .login("ana@example.com", &secret("Errada999"));
    let unknown_account = ctx
        .state
        .auth()
        .login("ghost@example.com", &secret("Senha123"));

    let Err(AuthError::InvalidCredentials) = wrong_password else {
        panic!("wrong password must be InvalidCredentials");
    };
    let Err(AuthError::InvalidCredentials) = unknown_account else {
        panic!("unknown account must be InvalidCredentials");
    };
    // Identical messages, nothing to enumerate on.
    assert_eq!(
        AuthError::InvalidCredentials.to_string(),
        AuthError::InvalidCredentials.to_string()
    );
}

#[test]
fn test_duplicate_registration_is_rejected_case_insensitively() {
    let ctx = TestContext::new();
    ctx.register("Ana Souza", "ana@example.com", Role::Client);

    let result = ctx.state.user_service().register(
        vitrine_store::services::users::NewUser {
            name: "Outra Ana".to_owned(),
            email: "ANA@EXAMPLE.COM".to_owned(),
            password: secret("Senha123"),
            password_confirmation: secret("Senha123"),
            role: Role::Client,
            phone: None,
            tax_id: None,
        },
    );
    assert!(matches!(result, Err(UserError::EmailTaken)));
}

#[test]
fn test_session_survives_restart() {
    let ctx = TestContext::new();
    ctx.register_and_login("Ana Souza", "ana@example.com", Role::Seller);

    let restarted = ctx.restart();
    let user = restarted.state.auth().current_user().unwrap().unwrap();
    assert_eq!(user.email.as_str(), "ana@example.com");
    assert_eq!(user.role, Role::Seller);
}

#[test]
fn test_session_expires_under_inactivity() {
    let ctx = TestContext::new();
    ctx.register_and_login("Ana Souza", "ana@example.com", Role::Client);

    ctx.clock.advance(Duration::minutes(29));
    assert!(ctx.state.auth().is_logged_in().unwrap());

    ctx.clock.advance(Duration::minutes(2));
    assert!(!ctx.state.auth().is_logged_in().unwrap());
    assert!(ctx.state.auth().current_user().unwrap().is_none());
}

#[test]
fn test_activity_keeps_session_alive_across_restart() {
    let ctx = TestContext::new();
    ctx.register_and_login("Ana Souza", "ana@example.com", Role::Client);

    for _ in 0..4 {
        ctx.clock.advance(Duration::minutes(20));
        ctx.state.auth().update_last_activity().unwrap();
    }

    let restarted = ctx.restart();
    assert!(restarted.state.auth().is_logged_in().unwrap());
}

#[test]
fn test_expired_session_is_not_restored_on_restart() {
    let ctx = TestContext::new();
    ctx.register_and_login("Ana Souza", "ana@example.com", Role::Client);

    ctx.clock.advance(Duration::hours(2));
    let restarted = ctx.restart();
    assert!(!restarted.state.auth().is_logged_in().unwrap());
}

#[test]
fn test_role_hierarchy_across_services() {
    let ctx = TestContext::new();
    ctx.register("Admin Geral", "admin@example.com", Role::Admin);
    ctx.register_and_login("Vera Lima", "vera@example.com", Role::Seller);

    assert!(ctx.state.auth().has_permission(Role::Client).unwrap());
    assert!(!ctx.state.auth().has_permission(Role::Admin).unwrap());
    assert!(matches!(
        ctx.state.user_service().list_users(),
        Err(UserError::PermissionDenied)
    ));

    ctx.state
        .auth()
        .login("admin@example.com", &secret("Senha123"))
        .unwrap();
    assert_eq!(ctx.state.user_service().list_users().unwrap().len(), 2);
}

#[test]
fn test_admin_cannot_delete_own_account() {
    let ctx = TestContext::new();
    let admin = ctx.register_and_login("Admin Geral", "admin@example.com", Role::Admin);
    let client = ctx.register("Ana Souza", "ana@example.com", Role::Client);

    assert!(matches!(
        ctx.state.user_service().delete_user(&admin.id),
        Err(UserError::CannotDeleteSelf)
    ));
    ctx.state.user_service().delete_user(&client.id).unwrap();
}

#[test]
fn test_change_password_applies_immediately() {
    let ctx = TestContext::new();
    ctx.register_and_login("Ana Souza", "ana@example.com", Role::Client);

    ctx.state
        .auth()
        .change_password(&secret("Senha123"), &secret("OutraSenha9"))
        .unwrap();
    ctx.state.auth().logout().unwrap();

    assert!(matches!(
        ctx.state.auth().login("ana@example.com", &secret("Senha123")),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(
        ctx.state
            .auth()
            .login("ana@example.com", &secret("OutraSenha9"))
            .is_ok()
    );
}
