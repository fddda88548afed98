use std::cmp::Ordering;
use std::convert::TryFrom;

use crate::result::{Result, Error};
use crate::entry::Entry;
use crate::util::compare_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Size,
    Offset,
    Container,
    Group,
    Index,
    RevName,
    RevSize,
    RevOffset,
    RevContainer,
    RevGroup,
    RevIndex,
}

pub type Order = [SortKey];

/// Lump number order, which is load order.
pub const DEFAULT_ORDER: [SortKey; 1] = [SortKey::Index];
pub const PHYSICAL_ORDER: [SortKey; 2] = [SortKey::Container, SortKey::Offset];

impl TryFrom<&str> for SortKey {
    type Error = Error;

    fn try_from(value: &str) -> Result<SortKey> {
        if value.eq_ignore_ascii_case("name") || value.eq_ignore_ascii_case("path") {
            Ok(SortKey::Name)
        } else if value.eq_ignore_ascii_case("size") {
            Ok(SortKey::Size)
        } else if value.eq_ignore_ascii_case("offset") {
            Ok(SortKey::Offset)
        } else if value.eq_ignore_ascii_case("container") || value.eq_ignore_ascii_case("file") {
            Ok(SortKey::Container)
        } else if value.eq_ignore_ascii_case("group") {
            Ok(SortKey::Group)
        } else if value.eq_ignore_ascii_case("index") || value.eq_ignore_ascii_case("lump") {
            Ok(SortKey::Index)
        } else if value.eq_ignore_ascii_case("-name") || value.eq_ignore_ascii_case("-path") {
            Ok(SortKey::RevName)
        } else if value.eq_ignore_ascii_case("-size") {
            Ok(SortKey::RevSize)
        } else if value.eq_ignore_ascii_case("-offset") {
            Ok(SortKey::RevOffset)
        } else if value.eq_ignore_ascii_case("-container") || value.eq_ignore_ascii_case("-file") {
            Ok(SortKey::RevContainer)
        } else if value.eq_ignore_ascii_case("-group") {
            Ok(SortKey::RevGroup)
        } else if value.eq_ignore_ascii_case("-index") || value.eq_ignore_ascii_case("-lump") {
            Ok(SortKey::RevIndex)
        } else {
            Err(Error::illegal_argument("--sort", value))
        }
    }
}

/// A lump number with its entry.
pub type Item<'a> = (usize, &'a Entry);

impl SortKey {
    #[inline]
    pub fn to_cmp(&self) -> impl Fn(&Item, &Item) -> Ordering {
        match self {
            SortKey::Name         => |a: &Item, b: &Item| compare_ignore_case(a.1.path(), b.1.path()),
            SortKey::Size         => |a: &Item, b: &Item| a.1.size().cmp(&b.1.size()),
            SortKey::Offset       => |a: &Item, b: &Item| a.1.offset().cmp(&b.1.offset()),
            SortKey::Container    => |a: &Item, b: &Item| a.1.container().cmp(&b.1.container()),
            SortKey::Group        => |a: &Item, b: &Item| a.1.group().name().cmp(b.1.group().name()),
            SortKey::Index        => |a: &Item, b: &Item| a.0.cmp(&b.0),

            SortKey::RevName      => |a: &Item, b: &Item| compare_ignore_case(b.1.path(), a.1.path()),
            SortKey::RevSize      => |a: &Item, b: &Item| b.1.size().cmp(&a.1.size()),
            SortKey::RevOffset    => |a: &Item, b: &Item| b.1.offset().cmp(&a.1.offset()),
            SortKey::RevContainer => |a: &Item, b: &Item| b.1.container().cmp(&a.1.container()),
            SortKey::RevGroup     => |a: &Item, b: &Item| b.1.group().name().cmp(a.1.group().name()),
            SortKey::RevIndex     => |a: &Item, b: &Item| b.0.cmp(&a.0),
        }
    }
}

type Cmp = Box<dyn Fn(&Item, &Item) -> Ordering>;

fn chain(cmp1: Cmp, cmp2: Cmp) -> Cmp {
    Box::new(move |a: &Item, b: &Item|
        match cmp1(a, b) {
            Ordering::Equal => cmp2(a, b),
            ord => ord,
        }
    )
}

fn make_chain(cmp1: Cmp, mut iter: std::slice::Iter<SortKey>) -> Cmp {
    if let Some(key) = iter.next() {
        make_chain(chain(cmp1, Box::new(key.to_cmp())), iter)
    } else {
        cmp1
    }
}

pub fn sort(list: &mut Vec<Item>, order: &Order) {
    let mut iter = order.iter();

    if let Some(first_key) = iter.next() {
        let cmp = make_chain(Box::new(first_key.to_cmp()), iter);
        list.sort_by(cmp);
    }
}

pub fn parse_order(value: &str) -> Result<Vec<SortKey>> {
    let mut order = Vec::new();
    for key in value.split(',') {
        order.push(SortKey::try_from(key)?);
    }
    Ok(order)
}
