use std::borrow::Cow;

/// Source identifier - mostly static constants ("INTRINIO", "YAHOO", "FRED")
pub type SourceId = Cow<'static, str>;
