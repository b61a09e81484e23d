pub type VertexIndex = u32;
pub type VertexNum = u32;
pub type ArcIndex = u32;
pub type ColorIndex = u32;
pub type Weight = u64;

/// an arc that belongs to no matching; colors of actual matchings are in `[0, b)`
pub const UNCOLORED: ColorIndex = ColorIndex::MAX;

/// returned by `color_edge` when the fan rooted at one endpoint cannot finish
/// and the caller should retry from the other endpoint
pub const TRY_OTHER_ENDPOINT: ColorIndex = ColorIndex::MAX - 1;
