/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and password policy
/// - [`jwt`]: HS256 access and refresh tokens
/// - [`middleware`]: bearer token extraction and the [`middleware::AuthContext`] extractor
/// - [`authorization`]: role checks
///
/// # Example
///
/// ```no_run
/// use staffdesk_shared::auth::jwt::{issue_token_pair, TokenTtl};
/// use staffdesk_shared::auth::password::{hash_password, verify_password};
/// use staffdesk_shared::domain::{identity::Email, user::{Role, User}};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("S3cure!pass")?;
/// let user = User::register(Email::new("jane@example.com")?, hash, vec![Role::User]);
///
/// if verify_password("S3cure!pass", user.password_hash())? {
///     let pair = issue_token_pair(&user, "a-secret-of-at-least-thirty-two-bytes", &TokenTtl::default())?;
///     println!("{}", pair.token);
/// }
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
