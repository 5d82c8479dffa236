pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod filters;
pub(crate) mod grain;
pub(crate) mod vignette;
