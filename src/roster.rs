// The ordered list of sprite identities and how each one was born.
// This is the list the sprite store reconciles against; uploads, duplicates,
// bin drops and resets all go through here.
use std::collections::HashMap;

use crate::geom::Point;
use crate::sprite::{Decoration, SpriteId, SpriteImage, SpritePayload};

#[derive(Default)]
pub struct Roster {
    order: Vec<SpriteId>,
    payloads: HashMap<SpriteId, SpritePayload>,
    next_id: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, payload: SpritePayload) -> SpriteId {
        let id = self.allocate();
        self.order.push(id);
        self.payloads.insert(id, payload);
        id
    }

    /// A segmented upload joins the scene at a random spot.
    pub fn push_fresh(&mut self, image: SpriteImage) -> SpriteId {
        self.push(SpritePayload::Fresh(image))
    }

    pub fn push_duplicate(&mut self, image: SpriteImage, position: Point, decorations: Vec<Decoration>) -> SpriteId {
        self.push(SpritePayload::Duplicated { image, position, decorations })
    }

    /// Returns false if the id was not listed.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        let before = self.order.len();
        self.order.retain(|&other| other != id);
        self.payloads.remove(&id);
        self.order.len() != before
    }

    /// Drop every sprite. Ids keep counting up so none is ever reused.
    pub fn clear(&mut self) {
        self.order.clear();
        self.payloads.clear();
    }

    pub fn order(&self) -> &[SpriteId] {
        &self.order
    }

    pub fn payloads(&self) -> &HashMap<SpriteId, SpritePayload> {
        &self.payloads
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    #[test]
    fn ids_are_never_reused() {
        let img = Arc::new(RgbaImage::new(1, 1));
        let mut roster = Roster::new();
        let a = roster.push_fresh(Arc::clone(&img));
        let b = roster.push_fresh(Arc::clone(&img));
        assert!(roster.remove(a));
        roster.clear();
        let c = roster.push_fresh(img);
        assert!(c > b);
        assert_eq!(roster.order(), &[c]);
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let mut roster = Roster::new();
        roster.push_fresh(Arc::new(RgbaImage::new(1, 1)));
        assert!(!roster.remove(SpriteId(99)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn duplicate_payload_keeps_spawn_details() {
        let mut roster = Roster::new();
        let id = roster.push_duplicate(Arc::new(RgbaImage::new(1, 1)), Point::new(5.0, 6.0), Vec::new());
        match roster.payloads().get(&id) {
            Some(SpritePayload::Duplicated { position, .. }) => assert_eq!(*position, Point::new(5.0, 6.0)),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
