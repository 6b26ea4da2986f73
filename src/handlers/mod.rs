// One handler module per resource. Each handler runs its checks in a fixed
// order and short-circuits on the first failure:
// schema -> identity parse -> auth -> existence -> ownership -> invariant.
pub mod petition_images;
pub mod petitions;
pub mod support_tiers;
pub mod supporters;
pub mod user_images;
pub mod users;
