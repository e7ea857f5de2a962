//! SeaORM entities mapping the bookmark manager tables.

pub mod bookmark;
pub mod bookmark_tag;
pub mod tag;
pub mod user;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;

    pub use super::bookmark::ActiveModel as BookmarkActiveModel;
    pub use super::bookmark::Column as BookmarkColumn;
    pub use super::bookmark::Entity as Bookmark;
    pub use super::bookmark::Model as BookmarkModel;

    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;
    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;

    pub use super::bookmark_tag::ActiveModel as BookmarkTagActiveModel;
    pub use super::bookmark_tag::Column as BookmarkTagColumn;
    pub use super::bookmark_tag::Entity as BookmarkTag;
    pub use super::bookmark_tag::Model as BookmarkTagModel;
}
