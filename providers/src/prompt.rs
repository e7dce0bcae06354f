//! Instructions sent with every verification and the reply shape they demand.
//!
//! The validator's parsing rules depend on this exact shape, so the field names
//! here and in [`idcheck_types::RequiredField`] must stay in lockstep.

use idcheck_types::RequiredField;
use serde_json::{Value, json};

/// Key of the order-mismatch sentinel object.
pub const ORDER_ERROR_KEY: &str = "error";

/// Value the oracle puts under [`ORDER_ERROR_KEY`] when the sides are swapped.
pub const ORDER_MISMATCH_SENTINEL: &str = "front/back order";

pub const VERIFICATION_PROMPT: &str = r#"You are an identity verification assistant.

You receive three images in this order:
1. The FRONT of a national identity card.
2. The BACK of the same card.
3. A live SELFIE of the person presenting the card.

The card follows one of two layouts:
- Legacy layout (yellow card with holograms): the front shows the document number, the
  surnames, the given names and the holder's signature; the back shows the date and place
  of birth, height, blood type, sex, the right index fingerprint, and the date and place
  of issue.
- Digital layout (current card with a QR code): the front shows the photo, the document
  number, surnames, given names, date and place of birth, sex and blood type; the back
  shows the date and place of issue, the QR code and the machine-readable zone.

First decide whether image 1 really is a front and image 2 really is a back for the
layout you recognise. If they are swapped or either side is not what it should be, reply
with exactly {"error": "front/back order"} and nothing else.

Otherwise:
1. Extract documentNumber, fullName (given names followed by surnames), dateOfBirth,
   dateOfIssue and placeOfIssue. Write both dates as yyyy-MM-dd.
2. Compare the face on the card with the selfie and set faceMatch to true only if they
   show the same person, otherwise false.

Return ONLY a JSON object with the keys documentNumber, fullName, dateOfBirth,
dateOfIssue, placeOfIssue and faceMatch. Use null for any value you cannot read. Do not
wrap the JSON in markdown."#;

/// Response schema declared alongside the prompt.
///
/// Every property is optional so that the single-key order sentinel still
/// conforms.
#[must_use]
pub fn reply_schema() -> Value {
    let mut properties = serde_json::Map::new();
    let mut ordering = Vec::with_capacity(RequiredField::ALL.len() + 1);

    for field in RequiredField::ALL {
        let kind = match field {
            RequiredField::FaceMatch => "BOOLEAN",
            _ => "STRING",
        };
        properties.insert(
            field.as_str().into(),
            json!({ "type": kind, "nullable": true }),
        );
        ordering.push(field.as_str());
    }
    properties.insert(ORDER_ERROR_KEY.into(), json!({ "type": "STRING" }));
    ordering.push(ORDER_ERROR_KEY);

    json!({
        "type": "OBJECT",
        "properties": properties,
        "propertyOrdering": ordering
    })
}
