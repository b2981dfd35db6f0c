/// A stored example seen from a query: its label and how far away it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor<'s> {
    pub label: &'s str,
    pub distance: f64,
}
