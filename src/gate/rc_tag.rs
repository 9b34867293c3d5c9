//! Release-candidate tag naming and ordering.
use log::*;
use regex::Regex;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A tag named `<release>-rc<number>`.
pub struct RcTag {
    pub name: String,
    pub number: u64,
}

/// Matches release-candidate siblings of one release tag.
///
/// The pattern is anchored on the full release tag so `v1.0.0` never picks up
/// `v11.0.0-rc1` or `v1.0.0.1-rc1`.
#[derive(Debug)]
pub struct RcPattern {
    regex: Regex,
}

impl RcPattern {
    pub fn new(release_tag: &str) -> Result<Self> {
        let pattern =
            format!(r"^{}-rc(?<number>[0-9]+)$", regex::escape(release_tag));
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn parse(&self, name: &str) -> Option<RcTag> {
        let captures = self.regex.captures(name)?;

        match captures["number"].parse::<u64>() {
            Ok(number) => Some(RcTag {
                name: name.to_string(),
                number,
            }),
            Err(err) => {
                debug!("ignoring rc tag {name}: unusable number: {err}");
                None
            }
        }
    }

    /// Highest matching candidate by numeric suffix. Equal numbers
    /// (`rc01`, `rc1`) fall back to the lexically highest name.
    pub fn highest<'a, I>(&self, names: I) -> Option<RcTag>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.parse(name))
            .max_by(|a, b| {
                a.number.cmp(&b.number).then_with(|| a.name.cmp(&b.name))
            })
    }
}
