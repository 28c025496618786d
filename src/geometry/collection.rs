use std::collections::HashSet;

use crate::error::{Result, TilingError};

use super::shape::NamedShape;

/// Which end of an ordered collection wins where shapes overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precedence {
    /// Higher index wins: a shape is cut by every shape inserted after it.
    #[default]
    LaterWins,
    /// Lower index wins: a shape is cut by every shape inserted before it.
    EarlierWins,
}

impl Precedence {
    /// Returns `true` if the shape at index `winner` overrides the shape at
    /// index `loser`.
    #[must_use]
    pub fn beats(self, winner: usize, loser: usize) -> bool {
        match self {
            Self::LaterWins => winner > loser,
            Self::EarlierWins => winner < loser,
        }
    }
}

/// Named shapes whose overlaps are resolved by position.
#[derive(Debug, Clone)]
pub struct OrderedShapes {
    shapes: Vec<NamedShape>,
    precedence: Precedence,
}

impl OrderedShapes {
    /// Builds an ordered collection; iteration order is precedence order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is empty or a label repeats.
    pub fn new(
        shapes: impl IntoIterator<Item = NamedShape>,
        precedence: Precedence,
    ) -> Result<Self> {
        let shapes = collect_unique(shapes)?;
        Ok(Self { shapes, precedence })
    }

    /// The overlap rule of this collection.
    #[must_use]
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Shapes in insertion order.
    #[must_use]
    pub fn shapes(&self) -> &[NamedShape] {
        &self.shapes
    }

    /// Shapes that override the shape at `index`, from the strongest down.
    pub fn winners_over(&self, index: usize) -> impl Iterator<Item = &NamedShape> + '_ {
        let precedence = self.precedence;
        let mut order: Vec<usize> = (0..self.shapes.len())
            .filter(|&j| precedence.beats(j, index))
            .collect();
        if precedence == Precedence::LaterWins {
            order.reverse();
        }
        order.into_iter().map(move |j| &self.shapes[j])
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the collection holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Named shapes with no overlap ordering, for fragment tiling.
#[derive(Debug, Clone)]
pub struct ShapeCollection {
    shapes: Vec<NamedShape>,
}

impl ShapeCollection {
    /// Builds an unordered collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is empty or a label repeats.
    pub fn new(shapes: impl IntoIterator<Item = NamedShape>) -> Result<Self> {
        Ok(Self {
            shapes: collect_unique(shapes)?,
        })
    }

    /// Shapes in insertion order.
    #[must_use]
    pub fn shapes(&self) -> &[NamedShape] {
        &self.shapes
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the collection holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl From<OrderedShapes> for ShapeCollection {
    fn from(ordered: OrderedShapes) -> Self {
        Self {
            shapes: ordered.shapes,
        }
    }
}

fn collect_unique(shapes: impl IntoIterator<Item = NamedShape>) -> Result<Vec<NamedShape>> {
    let shapes: Vec<NamedShape> = shapes.into_iter().collect();
    if shapes.is_empty() {
        return Err(TilingError::EmptyCollection.into());
    }
    let mut seen = HashSet::new();
    for shape in &shapes {
        if !seen.insert(shape.label.as_str()) {
            return Err(TilingError::DuplicateLabel(shape.label.clone()).into());
        }
    }
    Ok(shapes)
}
