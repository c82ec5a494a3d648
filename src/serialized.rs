use crate::jwt::{is_jwt, is_url_safe_base64_char};
use crate::SEPARATOR;

/// Parts of an SD-JWT in compact serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deserialized<'a> {
    /// Issuer-signed JWT.
    pub jwt: &'a str,

    /// Encoded disclosures, in order.
    pub disclosures: Vec<&'a str>,

    /// Holder binding JWT.
    pub holder_jwt: Option<&'a str>,

    /// The serialization ends with a separator, with or without a holder
    /// binding JWT after it.
    pub for_presentation: bool,
}

/// Splits an SD-JWT in compact serialization:
/// `<jwt>[~<disclosure>...][~[<holder_jwt>]]`.
///
/// Returns `None` if the input does not follow that pattern.
pub fn deserialize_string_format(serialized: &str) -> Option<Deserialized<'_>> {
    let mut segments = serialized.split(SEPARATOR);
    let jwt = segments.next().filter(|jwt| is_jwt(jwt))?;
    let mut disclosures: Vec<&str> = segments.collect();

    let (holder_jwt, for_presentation) = match disclosures.last() {
        None => (None, false),
        Some(last) if last.is_empty() => {
            disclosures.pop();
            (None, true)
        }
        Some(last) if is_jwt(last) => {
            let holder_jwt = disclosures.pop();
            (holder_jwt, true)
        }
        Some(_) => (None, false),
    };

    let well_formed = disclosures
        .iter()
        .all(|d| !d.is_empty() && d.bytes().all(is_url_safe_base64_char));

    well_formed.then_some(Deserialized {
        jwt,
        disclosures,
        holder_jwt,
        for_presentation,
    })
}

/// Joins the parts of an SD-JWT into its compact serialization.
///
/// A trailing separator is added when there is no holder binding JWT but the
/// result is meant for presentation.
pub fn serialize_string_format<'a>(
    jwt: &str,
    disclosures: impl IntoIterator<Item = &'a str>,
    holder_jwt: Option<&str>,
    for_presentation: bool,
) -> String {
    let mut serialized = jwt.to_owned();

    for disclosure in disclosures {
        serialized.push(SEPARATOR);
        serialized.push_str(disclosure);
    }

    if let Some(holder_jwt) = holder_jwt {
        serialized.push(SEPARATOR);
        serialized.push_str(holder_jwt);
    } else if for_presentation {
        serialized.push(SEPARATOR);
    }

    serialized
}

/// Whether `s` looks like an SD-JWT in compact serialization.
///
/// A plain JWT is an SD-JWT without disclosures.
pub fn is_sd_jwt(s: &str) -> bool {
    deserialize_string_format(s).is_some()
}
