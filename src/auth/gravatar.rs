use md5::{Digest, Md5};

/// Gravatar URL: 200px, pg-rated, "mystery person" fallback.
pub fn avatar_url(email: &str) -> String {
    let digest = Md5::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_normalized_email() {
        assert_eq!(
            avatar_url(" MyEmailAddress@example.com "),
            "https://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?s=200&r=pg&d=mm"
        );
    }
}
