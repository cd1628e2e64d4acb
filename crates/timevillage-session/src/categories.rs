//! Timer category management

use crate::error::Result;
use crate::session::{lock, Session, TARGET};
use timevillage_core::{
    next_position, plan_move, Category, CategoryId, MoveDirection, Rejection, DEFAULT_COLOR,
};

impl Session {
    /// All categories in display order
    pub fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.load_categories()?)
    }

    /// Append a category at the end of the list
    pub fn add_category(&self, name: &str, color_hex: Option<&str>) -> Result<Category> {
        let name = name.trim();
        Category::check_name(name)?;
        let color = color_hex.unwrap_or(DEFAULT_COLOR);
        Category::check_color(color)?;

        let _writer = lock(&self.writer);
        let position = next_position(&self.store.load_categories()?);
        let category = self.store.insert_category(name, color, position)?;
        tracing::debug!(target: TARGET, id = %category.id, name, position, "Category added");
        self.publish_categories()?;
        Ok(category)
    }

    /// Change a category's display name
    pub fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        let name = name.trim();
        Category::check_name(name)?;
        self.update_category(id, |category| category.name = name.to_string())
    }

    /// Change a category's colour
    pub fn recolor_category(&self, id: CategoryId, color_hex: &str) -> Result<Category> {
        Category::check_color(color_hex)?;
        self.update_category(id, |category| category.color_hex = color_hex.to_string())
    }

    fn update_category(
        &self,
        id: CategoryId,
        apply: impl FnOnce(&mut Category),
    ) -> Result<Category> {
        let _writer = lock(&self.writer);
        let mut category = self
            .store
            .load_category(id)?
            .ok_or(Rejection::CategoryNotFound(id))?;
        apply(&mut category);
        self.store.save_categories(std::slice::from_ref(&category))?;
        self.publish_categories()?;
        Ok(category)
    }

    /// Remove a category
    pub fn delete_category(&self, id: CategoryId) -> Result<()> {
        let _writer = lock(&self.writer);
        if !self.store.delete_category(id)? {
            return Err(Rejection::CategoryNotFound(id).into());
        }
        tracing::debug!(target: TARGET, %id, "Category deleted");
        self.publish_categories()?;
        Ok(())
    }

    /// Swap a category with its neighbour
    ///
    /// Returns `Ok(false)` when it is already first (up) or last (down).
    pub fn move_category(&self, id: CategoryId, direction: MoveDirection) -> Result<bool> {
        let _writer = lock(&self.writer);
        let ordered = self.store.load_categories()?;
        let Some((moved, displaced)) = plan_move(&ordered, id, direction)? else {
            return Ok(false);
        };
        self.store.save_categories(&[moved, displaced])?;
        self.publish_categories()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::session::tests::open_session;
    use timevillage_core::{CategoryId, MoveDirection, PolicyKind, Rejection, DEFAULT_COLOR};

    fn names(session: &crate::Session) -> Vec<String> {
        session
            .categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn test_add_appends() {
        let session = open_session(PolicyKind::HubCapped);
        let study = session.add_category("Study", None).unwrap();
        let work = session.add_category("Work", Some("#FF112233")).unwrap();

        assert_eq!(study.position, 0);
        assert_eq!(study.color_hex, DEFAULT_COLOR);
        assert_eq!(work.position, 1);
        assert_eq!(names(&session), vec!["Study", "Work"]);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let session = open_session(PolicyKind::HubCapped);
        let err = session.add_category("   ", None).unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::BlankCategoryName));

        let err = session.add_category("Study", Some("green")).unwrap_err();
        assert!(matches!(err.rejection(), Some(Rejection::InvalidColor(_))));
        assert!(session.categories().unwrap().is_empty());
    }

    #[test]
    fn test_rename_and_recolor() {
        let session = open_session(PolicyKind::HubCapped);
        let study = session.add_category("Study", None).unwrap();

        session.rename_category(study.id, "Reading").unwrap();
        let updated = session.recolor_category(study.id, "#123ABC").unwrap();
        assert_eq!(updated.name, "Reading");
        assert_eq!(updated.color_hex, "#123ABC");
        assert_eq!(updated.position, study.position);

        let err = session.rename_category(CategoryId::new(42), "x").unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_move_and_delete() {
        let session = open_session(PolicyKind::HubCapped);
        let a = session.add_category("A", None).unwrap();
        let b = session.add_category("B", None).unwrap();
        session.add_category("C", None).unwrap();
        let mut live = session.subscribe_categories();

        assert!(!session.move_category(a.id, MoveDirection::Up).unwrap());
        assert!(session.move_category(a.id, MoveDirection::Down).unwrap());
        assert_eq!(names(&session), vec!["B", "A", "C"]);

        session.delete_category(b.id).unwrap();
        assert_eq!(names(&session), vec!["A", "C"]);
        assert!(session.delete_category(b.id).unwrap_err().is_rejection());

        let latest: Vec<String> = live.latest().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(latest, vec!["A", "C"]);
    }

    #[test]
    fn test_new_category_after_delete_goes_last() {
        let session = open_session(PolicyKind::HubCapped);
        let a = session.add_category("A", None).unwrap();
        session.add_category("B", None).unwrap();
        session.delete_category(a.id).unwrap();

        let c = session.add_category("C", None).unwrap();
        assert_eq!(c.position, 2);
        assert_eq!(names(&session), vec!["B", "C"]);
    }
}
