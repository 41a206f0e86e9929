/// Prefix of the line logged once a server is listening, followed by its url.
pub const STARTED_ON: &str = "Started on";
