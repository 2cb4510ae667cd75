use crate::keymap::KeyPosition;

/// One physical key: where it sits and what is printed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalKey {
    pub position: KeyPosition,
    pub legend: String,
    /// Width in key units.
    pub width: u16,
}

/// Rows of physical keys, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    rows: Vec<Vec<PhysicalKey>>,
}

impl KeyboardLayout {
    pub fn new(rows: Vec<Vec<(&str, u16)>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, (legend, width))| PhysicalKey {
                        position: KeyPosition::new(format!("r{r}c{c}")),
                        legend: legend.to_string(),
                        width,
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Row-staggered board matching the legends of [`FingerGuide::qwerty`].
    ///
    /// [`FingerGuide::qwerty`]: crate::finger::FingerGuide::qwerty
    pub fn standard() -> Self {
        let letter = |l: &'static str| (l, 1u16);
        Self::new(vec![
            std::iter::once(("Tab", 2))
                .chain("QWERTYUIOP".split_inclusive(|_| true).map(letter))
                .chain([("-", 1), ("BS", 2)])
                .collect(),
            std::iter::once(("Caps", 2))
                .chain("ASDFGHJKL".split_inclusive(|_| true).map(letter))
                .chain([("Ent", 2)])
                .collect(),
            std::iter::once(("Shift", 3))
                .chain("ZXCVBNM,./".split_inclusive(|_| true).map(letter))
                .chain([("Up", 1)])
                .collect(),
        ])
    }

    pub fn rows(&self) -> &[Vec<PhysicalKey>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn key_at(&self, row: usize, col: usize) -> Option<&PhysicalKey> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn find(&self, position: &str) -> Option<&PhysicalKey> {
        self.rows
            .iter()
            .flatten()
            .find(|k| k.position.as_str() == position)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PhysicalKey> {
        self.rows.iter().flatten()
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Editor cursor over a [`KeyboardLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyCursor {
    pub row: usize,
    pub col: usize,
}

impl KeyCursor {
    pub fn up(&mut self, layout: &KeyboardLayout) {
        self.row = self.row.saturating_sub(1);
        self.clamp(layout);
    }

    pub fn down(&mut self, layout: &KeyboardLayout) {
        if self.row + 1 < layout.row_count() {
            self.row += 1;
        }
        self.clamp(layout);
    }

    pub fn left(&mut self, layout: &KeyboardLayout) {
        self.col = self.col.saturating_sub(1);
        self.clamp(layout);
    }

    pub fn right(&mut self, layout: &KeyboardLayout) {
        self.col += 1;
        self.clamp(layout);
    }

    pub fn key<'a>(&self, layout: &'a KeyboardLayout) -> Option<&'a PhysicalKey> {
        layout.key_at(self.row, self.col)
    }

    fn clamp(&mut self, layout: &KeyboardLayout) {
        if let Some(row) = layout.rows().get(self.row) {
            self.col = self.col.min(row.len().saturating_sub(1));
        }
    }
}
