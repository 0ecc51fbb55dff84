//! Position within a scene.
//!
//! A cursor is an explicit stack of frames. The root frame walks the outer
//! sequence; entering a carousel with children pushes a frame over those
//! children, so nesting depth never grows the call stack. When a nested
//! frame is exhausted it is popped and its parent moves on.

use scenetour_scene::application::compile::CompiledScene;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    /// Scene indices walked by this frame.
    members: Vec<usize>,
    position: usize,
}

impl Frame {
    fn new(members: &[usize]) -> Self {
        Self {
            members: members.to_vec(),
            position: 0,
        }
    }

    fn current(&self) -> usize {
        self.members[self.position]
    }
}

/// The active position of a running tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    root: Frame,
    nested: Vec<Frame>,
}

impl Cursor {
    /// Positions a cursor on the first step of `scene`, descending into
    /// carousels as needed.
    #[must_use]
    pub fn first(scene: &CompiledScene) -> Self {
        let mut cursor = Self {
            root: Frame::new(scene.top_level()),
            nested: Vec::new(),
        };
        cursor.descend(scene);
        cursor
    }

    fn descend(&mut self, scene: &CompiledScene) {
        loop {
            let children = scene.children(self.active());
            if children.is_empty() {
                break;
            }
            self.nested.push(Frame::new(children));
        }
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::once(&self.root).chain(self.nested.iter())
    }

    /// Scene index of the innermost active step, the one validated on
    /// advance.
    #[must_use]
    pub fn active(&self) -> usize {
        self.nested.last().unwrap_or(&self.root).current()
    }

    /// Position in the outer sequence.
    #[must_use]
    pub fn outer_index(&self) -> usize {
        self.root.position
    }

    /// Scene index of the active outer step.
    #[must_use]
    pub fn outer_step(&self) -> usize {
        self.root.current()
    }

    /// Positions of every frame, outermost first.
    #[must_use]
    pub fn path(&self) -> Vec<usize> {
        self.frames().map(|frame| frame.position).collect()
    }

    /// `(position, length)` of the innermost carousel frame, if any.
    #[must_use]
    pub fn child_progress(&self) -> Option<(usize, usize)> {
        self.nested
            .last()
            .map(|frame| (frame.position, frame.members.len()))
    }

    /// Returns the cursor one step further on, or `None` when the outer
    /// sequence is exhausted.
    #[must_use]
    pub fn successor(&self, scene: &CompiledScene) -> Option<Self> {
        let mut next = self.clone();
        loop {
            let frame = next.nested.last_mut().unwrap_or(&mut next.root);
            if frame.position + 1 < frame.members.len() {
                frame.position += 1;
                next.descend(scene);
                return Some(next);
            }
            next.nested.pop()?;
        }
    }

    /// Scene indices of the steps this cursor shows that `previous` did not,
    /// outermost first. Every step is new when there is no previous cursor.
    #[must_use]
    pub fn entered_since(&self, previous: Option<&Cursor>) -> Vec<usize> {
        let shared = previous.map_or(0, |previous| {
            self.frames()
                .zip(previous.frames())
                .take_while(|(mine, theirs)| mine == theirs)
                .count()
        });
        self.frames()
            .skip(shared)
            .map(Frame::current)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenetour_scene::domain::scene::SceneDef;
    use scenetour_scene::domain::step::{BaseStep, CarouselStep, StepBase, StepDef};

    fn base(id: &str) -> StepDef {
        StepDef::Base(BaseStep {
            base: StepBase {
                id: Some(id.to_owned()),
                ..StepBase::default()
            },
        })
    }

    fn carousel(id: &str, children: &[&str]) -> StepDef {
        StepDef::Carousel(CarouselStep {
            base: StepBase {
                id: Some(id.to_owned()),
                ..StepBase::default()
            },
            top_offset: None,
            left_offset: None,
            children: children.iter().map(|c| (*c).to_owned()).collect(),
        })
    }

    fn walk(scene: &CompiledScene) -> Vec<(usize, Vec<usize>)> {
        let mut visited = Vec::new();
        let mut cursor = Some(Cursor::first(scene));
        while let Some(current) = cursor {
            visited.push((current.active(), current.path()));
            cursor = current.successor(scene);
        }
        visited
    }

    #[test]
    fn test_flat_scene_walks_in_order() {
        let scene =
            CompiledScene::compile(SceneDef::new(vec![base("a"), base("b"), base("c")])).unwrap();

        let visited = walk(&scene);

        assert_eq!(
            visited,
            vec![(0, vec![0]), (1, vec![1]), (2, vec![2])]
        );
    }

    #[test]
    fn test_carousel_children_are_walked_before_outer_index_moves() {
        // Arrange
        let scene = CompiledScene::compile(SceneDef::new(vec![
            base("intro"),
            carousel("tips", &["t1", "t2"]),
            base("t1"),
            base("t2"),
            base("outro"),
        ]))
        .unwrap();

        // Act
        let visited = walk(&scene);

        // Assert
        assert_eq!(
            visited,
            vec![
                (0, vec![0]),
                (2, vec![1, 0]),
                (3, vec![1, 1]),
                (4, vec![2]),
            ]
        );
    }

    #[test]
    fn test_nested_carousels_use_a_frame_per_level() {
        // Arrange
        let scene = CompiledScene::compile(SceneDef::new(vec![
            carousel("outer", &["inner", "c"]),
            carousel("inner", &["a", "b"]),
            base("a"),
            base("b"),
            base("c"),
        ]))
        .unwrap();

        // Act
        let visited = walk(&scene);

        // Assert
        assert_eq!(
            visited,
            vec![(2, vec![0, 0, 0]), (3, vec![0, 0, 1]), (4, vec![0, 1])]
        );
    }

    #[test]
    fn test_carousel_without_children_is_a_plain_step() {
        let scene =
            CompiledScene::compile(SceneDef::new(vec![carousel("empty", &[]), base("b")])).unwrap();

        let cursor = Cursor::first(&scene);

        assert_eq!(cursor.active(), 0);
        assert_eq!(cursor.child_progress(), None);
    }

    #[test]
    fn test_entered_since_lists_only_new_frames() {
        // Arrange
        let scene = CompiledScene::compile(SceneDef::new(vec![
            base("intro"),
            carousel("tips", &["t1", "t2"]),
            base("t1"),
            base("t2"),
        ]))
        .unwrap();
        let first = Cursor::first(&scene);
        let into_carousel = first.successor(&scene).unwrap();
        let second_tip = into_carousel.successor(&scene).unwrap();

        // Act / Assert
        assert_eq!(first.entered_since(None), vec![0]);
        assert_eq!(into_carousel.entered_since(Some(&first)), vec![1, 2]);
        assert_eq!(second_tip.entered_since(Some(&into_carousel)), vec![3]);
        assert_eq!(second_tip.child_progress(), Some((1, 2)));
        assert_eq!(second_tip.outer_index(), 1);
        assert_eq!(second_tip.outer_step(), 1);
    }
}
