//! Region and purpose classification of node names

use lazy_static::lazy_static;
use regex::Regex;

/// Geography or purpose label used to group nodes in client menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionTag {
    HongKong,
    Taiwan,
    Singapore,
    Japan,
    UnitedStates,
    Korea,
    Streaming,
}

impl RegionTag {
    /// All tags in the order their groups are emitted
    pub const ALL: [RegionTag; 7] = [
        RegionTag::HongKong,
        RegionTag::Taiwan,
        RegionTag::Singapore,
        RegionTag::Japan,
        RegionTag::UnitedStates,
        RegionTag::Korea,
        RegionTag::Streaming,
    ];

    /// Name of the selector group holding the tagged nodes
    pub fn group_name(self) -> &'static str {
        match self {
            RegionTag::HongKong => "🇭🇰 香港节点",
            RegionTag::Taiwan => "🇹🇼 台湾节点",
            RegionTag::Singapore => "🇸🇬 狮城节点",
            RegionTag::Japan => "🇯🇵 日本节点",
            RegionTag::UnitedStates => "🇺🇲 美国节点",
            RegionTag::Korea => "🇰🇷 韩国节点",
            RegionTag::Streaming => "🎥 奈飞节点",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegionTag::HongKong => "HK",
            RegionTag::Taiwan => "TW",
            RegionTag::Singapore => "SG",
            RegionTag::Japan => "JP",
            RegionTag::UnitedStates => "US",
            RegionTag::Korea => "KR",
            RegionTag::Streaming => "streaming",
        }
    }

    /// Latin words matched case-insensitively on letter boundaries, and
    /// literals (CJK, flags) matched anywhere
    fn patterns(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            RegionTag::HongKong => (&["HK", "HKG", r"Hong\s?Kong"], &["港", "🇭🇰"]),
            RegionTag::Taiwan => (&["TW", "TWN", "Taiwan", "Taipei"], &["台", "臺", "🇹🇼"]),
            RegionTag::Singapore => (
                &["SG", "SGP", "Singapore"],
                &["新加坡", "狮城", "獅城", "坡", "🇸🇬"],
            ),
            RegionTag::Japan => (
                &["JP", "JPN", "Japan", "Tokyo", "Osaka"],
                &["日本", "东京", "東京", "大阪", "埼玉", "川日", "泉日", "🇯🇵"],
            ),
            RegionTag::UnitedStates => (
                &[
                    "US",
                    "USA",
                    r"United\s?States",
                    "America",
                    r"Los\s?Angeles",
                    r"San\s?Jose",
                    "Seattle",
                    "Chicago",
                    "Dallas",
                ],
                &["美", "洛杉矶", "圣何塞", "西雅图", "芝加哥", "硅谷", "🇺🇸", "🇺🇲"],
            ),
            RegionTag::Korea => (
                &["KR", "KOR", "Korea", "Seoul"],
                &["韩", "韓", "首尔", "🇰🇷"],
            ),
            RegionTag::Streaming => (
                &["NF", "Netflix", "Disney", r"Disney\+", "Stream(?:ing)?"],
                &["奈飞", "网飞", "解锁", "流媒体", "🎥"],
            ),
        }
    }
}

fn build_matcher(words: &[&str], literals: &[&str]) -> Regex {
    let mut alternatives = Vec::new();
    if !words.is_empty() {
        alternatives.push(format!(
            "(?i:(?:^|[^a-z])(?:{})(?:[^a-z]|$))",
            words.join("|")
        ));
    }
    alternatives.extend(literals.iter().map(|literal| regex::escape(literal)));
    Regex::new(&alternatives.join("|")).unwrap()
}

lazy_static! {
    static ref REGION_MATCHERS: Vec<(RegionTag, Regex)> = RegionTag::ALL
        .iter()
        .map(|tag| {
            let (words, literals) = tag.patterns();
            (*tag, build_matcher(words, literals))
        })
        .collect();
}

/// Tags whose patterns match `name`, in table order
pub fn classify(name: &str) -> Vec<RegionTag> {
    REGION_MATCHERS
        .iter()
        .filter(|(_, matcher)| matcher.is_match(name))
        .map(|(tag, _)| *tag)
        .collect()
}

/// Region groups with at least one member, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionGroups {
    groups: Vec<(RegionTag, Vec<String>)>,
}

impl RegionGroups {
    /// Classify every node.
    ///
    /// Each item is `(name to classify, name to list as member)`; the two
    /// differ when a target cleans names before emitting them. Member order
    /// follows input order and repeated names are listed once.
    pub fn build<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut members: Vec<Vec<String>> = vec![Vec::new(); RegionTag::ALL.len()];
        for (name, member) in nodes {
            for tag in classify(name) {
                let list = &mut members[tag as usize];
                if !list.iter().any(|existing| existing == member) {
                    list.push(member.to_string());
                }
            }
        }

        RegionGroups {
            groups: RegionTag::ALL
                .iter()
                .copied()
                .zip(members)
                .filter(|(_, list)| !list.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, tag: RegionTag) -> bool {
        self.groups.iter().any(|(t, _)| *t == tag)
    }

    pub fn members(&self, tag: RegionTag) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, list)| list.as_slice())
    }

    /// Non-empty tags in table order
    pub fn tags(&self) -> impl Iterator<Item = RegionTag> + '_ {
        self.groups.iter().map(|(tag, _)| *tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionTag, &[String])> + '_ {
        self.groups.iter().map(|(tag, list)| (*tag, list.as_slice()))
    }
}
