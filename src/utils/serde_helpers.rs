//! Lenient decoding helpers for the backend's loosely shaped JSON.

use serde::{Deserialize, Deserializer};

/// Decode a nullable field into its default instead of failing. The backend
/// emits `"replies": null` on freshly created comments, and older payloads
/// drop the author snapshot entirely.
pub fn none_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Handle the two dialects of the `likes` field: the nested payload carries
/// an array of user ids, the flat payload a bare count.
pub mod likes {
    use crate::models::comment::{LikeSet, UserId};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LikesRepr {
        Users(Vec<UserId>),
        Count(u64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<LikeSet, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<LikesRepr>::deserialize(deserializer)? {
            Some(LikesRepr::Users(users)) => LikeSet::from_users(users),
            Some(LikesRepr::Count(count)) => LikeSet::from_count(count),
            None => LikeSet::default(),
        })
    }

    pub fn serialize<S>(likes: &LikeSet, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Round-trip in the dialect the value arrived in
        if likes.base_count() == 0 {
            let users = likes.known_users();
            let mut seq = serializer.serialize_seq(Some(users.len()))?;
            for user in users {
                seq.serialize_element(user)?;
            }
            seq.end()
        } else {
            serializer.serialize_u64(likes.count())
        }
    }
}
