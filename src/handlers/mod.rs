// Handlers are split by security tier:
// public (no auth) and protected (bearer token checked by middleware).
pub mod protected;
pub mod public;
