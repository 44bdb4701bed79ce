//! Index selections accepted by [`SsifReader::get_image`](crate::ssif_reader::SsifReader::get_image).
//!
//! A single index and a list of indices are interchangeable: a single index behaves as a
//! list of length one.

/// A selection along the Z or T axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(usize),
    Many(Vec<usize>),
}

impl Selection {
    /// The selected indices, in request order.
    pub fn as_slice(&self) -> &[usize] {
        match self {
            Selection::Single(index) => std::slice::from_ref(index),
            Selection::Many(indices) => indices,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Single(0)
    }
}

impl From<usize> for Selection {
    fn from(index: usize) -> Self {
        Selection::Single(index)
    }
}

impl From<Vec<usize>> for Selection {
    fn from(indices: Vec<usize>) -> Self {
        Selection::Many(indices)
    }
}

impl From<&[usize]> for Selection {
    fn from(indices: &[usize]) -> Self {
        Selection::Many(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Selection {
    fn from(indices: [usize; N]) -> Self {
        Selection::Many(indices.to_vec())
    }
}

impl From<std::ops::Range<usize>> for Selection {
    fn from(range: std::ops::Range<usize>) -> Self {
        Selection::Many(range.collect())
    }
}

/// A selection along the C axis, either by index or by channel name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelection {
    Index(Selection),
    Names(Vec<String>),
}

impl Default for ChannelSelection {
    fn default() -> Self {
        ChannelSelection::Index(Selection::default())
    }
}

impl From<Selection> for ChannelSelection {
    fn from(selection: Selection) -> Self {
        ChannelSelection::Index(selection)
    }
}

macro_rules! channel_index_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ChannelSelection {
                fn from(indices: $ty) -> Self {
                    ChannelSelection::Index(Selection::from(indices))
                }
            }
        )*
    };
}

channel_index_from!(usize, Vec<usize>, &[usize], std::ops::Range<usize>);

impl<const N: usize> From<[usize; N]> for ChannelSelection {
    fn from(indices: [usize; N]) -> Self {
        ChannelSelection::Index(Selection::from(indices))
    }
}

impl From<&str> for ChannelSelection {
    fn from(name: &str) -> Self {
        ChannelSelection::Names(vec![name.to_string()])
    }
}

impl From<String> for ChannelSelection {
    fn from(name: String) -> Self {
        ChannelSelection::Names(vec![name])
    }
}

impl From<Vec<&str>> for ChannelSelection {
    fn from(names: Vec<&str>) -> Self {
        ChannelSelection::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ChannelSelection {
    fn from(names: Vec<String>) -> Self {
        ChannelSelection::Names(names)
    }
}

impl From<&[&str]> for ChannelSelection {
    fn from(names: &[&str]) -> Self {
        ChannelSelection::Names(names.iter().map(|name| name.to_string()).collect())
    }
}
