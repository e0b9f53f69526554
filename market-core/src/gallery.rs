//! Состояние галереи объявления и учёт изображений при редактировании.

use crate::media::GalleryImage;

/// Максимум изображений у одного объявления.
pub const MAX_IMAGES: usize = 10;

/// Период автопрокрутки карусели.
pub const AUTO_ADVANCE_MS: u32 = 5_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Карусель изображений: текущий кадр, пауза автопрокрутки и полноэкранный
/// режим.
pub struct Carousel {
    len: usize,
    index: usize,
    paused: bool,
    fullscreen: bool,
}

impl Carousel {
    /// Карусель на `len` изображений, начиная с первого.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    /// Индекс текущего изображения.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Количество изображений.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Изображений нет.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Показывать ли стрелки и миниатюры.
    pub fn has_controls(&self) -> bool {
        self.len > 1
    }

    /// Автопрокрутка остановлена пользователем.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Открыт полноэкранный просмотр.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Следующий кадр по кругу.
    pub fn next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = (self.index + 1) % self.len;
    }

    /// Предыдущий кадр по кругу.
    pub fn prev(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = (self.index + self.len - 1) % self.len;
    }

    /// Выбор миниатюры. Ставит автопрокрутку на паузу; индекс вне диапазона
    /// игнорируется.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.index = index;
        self.paused = true;
        true
    }

    /// Шаг таймера автопрокрутки. Возвращает `true`, если кадр сменился.
    pub fn tick(&mut self) -> bool {
        if self.len < 2 || self.paused || self.fullscreen {
            return false;
        }
        self.next();
        true
    }

    /// Останавливает автопрокрутку (например, при наведении мыши).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Возобновляет автопрокрутку.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Переключает полноэкранный режим; без изображений не открывается.
    pub fn toggle_fullscreen(&mut self) {
        if self.fullscreen {
            self.fullscreen = false;
        } else if self.len > 0 {
            self.fullscreen = true;
        }
    }

    /// Закрывает полноэкранный режим.
    pub fn close_fullscreen(&mut self) {
        self.fullscreen = false;
    }

    /// Меняет число изображений (после загрузки или удаления) и
    /// ограничивает индекс.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
        if len == 0 {
            self.fullscreen = false;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Учёт изображений в форме редактирования: какие существующие помечены на
/// удаление и сколько новых выбрано.
pub struct ImageEditState {
    existing: Vec<GalleryImage>,
    to_delete: Vec<i64>,
    new_uploads: usize,
}

impl ImageEditState {
    /// Начальное состояние по текущим изображениям объявления.
    pub fn new(existing: Vec<GalleryImage>) -> Self {
        Self {
            existing,
            ..Self::default()
        }
    }

    /// Помечает изображение на удаление. Изображения без id удалить нельзя.
    pub fn mark_for_deletion(&mut self, id: i64) -> bool {
        let known = self.existing.iter().any(|image| image.id == Some(id));
        if !known || self.to_delete.contains(&id) {
            return false;
        }
        self.to_delete.push(id);
        true
    }

    /// Снимает пометку удаления.
    pub fn restore(&mut self, id: i64) -> bool {
        let before = self.to_delete.len();
        self.to_delete.retain(|&marked| marked != id);
        before != self.to_delete.len()
    }

    /// Помечено ли изображение на удаление.
    pub fn is_marked(&self, id: i64) -> bool {
        self.to_delete.contains(&id)
    }

    /// Все существующие изображения, включая помеченные.
    pub fn existing(&self) -> &[GalleryImage] {
        &self.existing
    }

    /// Существующие изображения, которые останутся после сохранения.
    pub fn visible_existing(&self) -> Vec<&GalleryImage> {
        self.existing
            .iter()
            .filter(|image| image.id.is_none_or(|id| !self.to_delete.contains(&id)))
            .collect()
    }

    /// Запоминает количество выбранных новых файлов, если оно влезает в
    /// лимит.
    pub fn set_new_uploads(&mut self, count: usize) -> bool {
        if !self.can_accept(count) {
            return false;
        }
        self.new_uploads = count;
        true
    }

    /// Количество выбранных новых файлов.
    pub fn new_uploads(&self) -> usize {
        self.new_uploads
    }

    /// Влезут ли `count` новых файлов рядом с оставшимися изображениями.
    pub fn can_accept(&self, count: usize) -> bool {
        self.visible_existing().len() + count <= MAX_IMAGES
    }

    /// Сколько ещё изображений можно добавить.
    pub fn remaining_slots(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.visible_existing().len() + self.new_uploads)
    }

    /// Значение поля `images_to_delete`: JSON-массив id или `None`.
    pub fn images_to_delete_json(&self) -> Option<String> {
        if self.to_delete.is_empty() {
            return None;
        }
        serde_json::to_string(&self.to_delete).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i64) -> GalleryImage {
        GalleryImage {
            id: Some(id),
            url: format!("http://localhost/uploads/{id}.jpg"),
        }
    }

    #[test]
    fn next_and_prev_wrap_around() {
        let mut carousel = Carousel::new(3);
        carousel.prev();
        assert_eq!(carousel.index(), 2);
        carousel.next();
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn empty_carousel_ignores_navigation() {
        let mut carousel = Carousel::new(0);
        carousel.next();
        carousel.prev();
        carousel.toggle_fullscreen();
        assert_eq!(carousel.index(), 0);
        assert!(!carousel.is_fullscreen());
        assert!(!carousel.tick());
    }

    #[test]
    fn thumbnail_selection_pauses_auto_advance() {
        let mut carousel = Carousel::new(4);
        assert!(carousel.tick());
        assert_eq!(carousel.index(), 1);

        assert!(carousel.select(3));
        assert!(carousel.is_paused());
        assert!(!carousel.tick());
        assert_eq!(carousel.index(), 3);

        assert!(!carousel.select(9));
        assert_eq!(carousel.index(), 3);

        carousel.resume();
        assert!(carousel.tick());
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn single_image_and_fullscreen_do_not_auto_advance() {
        let mut single = Carousel::new(1);
        assert!(!single.tick());

        let mut carousel = Carousel::new(2);
        carousel.toggle_fullscreen();
        assert!(carousel.is_fullscreen());
        assert!(!carousel.tick());
        carousel.close_fullscreen();
        assert!(carousel.tick());
    }

    #[test]
    fn set_len_clamps_index() {
        let mut carousel = Carousel::new(5);
        carousel.select(4);
        carousel.set_len(2);
        assert_eq!(carousel.index(), 1);
        carousel.toggle_fullscreen();
        carousel.set_len(0);
        assert_eq!(carousel.index(), 0);
        assert!(!carousel.is_fullscreen());
    }

    #[test]
    fn deletion_bookkeeping_tracks_marked_ids() {
        let mut state = ImageEditState::new(vec![image(1), image(2), image(3)]);
        assert!(state.images_to_delete_json().is_none());

        assert!(state.mark_for_deletion(2));
        assert!(!state.mark_for_deletion(2));
        assert!(!state.mark_for_deletion(42));
        assert!(state.mark_for_deletion(3));

        assert_eq!(state.visible_existing().len(), 1);
        assert_eq!(state.images_to_delete_json().as_deref(), Some("[2,3]"));

        assert!(state.restore(3));
        assert!(!state.restore(3));
        assert_eq!(state.images_to_delete_json().as_deref(), Some("[2]"));
    }

    #[test]
    fn upload_limit_counts_remaining_images() {
        let existing = (1..=8).map(image).collect();
        let mut state = ImageEditState::new(existing);
        assert_eq!(state.remaining_slots(), 2);
        assert!(!state.set_new_uploads(3));

        state.mark_for_deletion(1);
        assert!(state.set_new_uploads(3));
        assert_eq!(state.new_uploads(), 3);
        assert_eq!(state.remaining_slots(), 0);
    }

    #[test]
    fn images_without_id_stay_visible() {
        let state = ImageEditState::new(vec![GalleryImage {
            id: None,
            url: "legacy".to_string(),
        }]);
        assert_eq!(state.visible_existing().len(), 1);
    }
}
