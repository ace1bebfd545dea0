use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub exp: i64,
}

impl UserClaims {
    /// Claims for `user_id` expiring one day from now.
    pub fn for_user(user_id: uuid::Uuid) -> Self {
        let exp = (chrono::Utc::now() + chrono::Duration::days(1)).timestamp();
        Self {
            sub: user_id.to_string(),
            exp,
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_roundtrip_keeps_subject() {
        let id = uuid::Uuid::new_v4();
        let token = generate_token(UserClaims::for_user(id), "secret").unwrap();
        let data = process_token(&token, "secret").unwrap();
        assert_eq!(data.claims.sub, id.to_string());
    }

    #[test]
    fn token_with_wrong_key_is_rejected() {
        let token = generate_token(UserClaims::for_user(uuid::Uuid::new_v4()), "secret").unwrap();
        assert!(process_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = UserClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp(),
        };
        let token = generate_token(claims, "secret").unwrap();
        assert!(process_token(&token, "secret").is_err());
    }
}
