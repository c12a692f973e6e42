//! The row codec contract.

use crate::error::CodecResult;
use crate::row::Row;

/// Bidirectional mapping between a domain entity and its backend row.
///
/// `to_row` never fails. `from_row` fails only when the row cannot be
/// identified; every other absent column decodes to the entity's
/// declared default.
pub trait RowCodec: Sized {
    /// Extra information the encoder needs that the entity does not carry,
    /// such as a list position.
    type Context;

    /// Backend table holding rows of this entity.
    const TABLE: &'static str;

    /// Encodes the entity into a row.
    fn to_row(&self, ctx: Self::Context) -> Row;

    /// Decodes an entity from a row.
    fn from_row(row: &Row) -> CodecResult<Self>;
}
