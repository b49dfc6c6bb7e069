//! Image service

use std::sync::Arc;

use super::{ensure_exist, group_ids};
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Registry, Table, UnitOfWork};
use crate::models::{
    clean, CreateUpdateImage, Element, ElementValue, Image, ImageDto, ImageElementRef,
    ImageElementValueRef, TargetLinks,
};
use crate::{Error, Result};

pub struct ImageService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl ImageService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<ImageDto>> {
        let images = self.registry.all::<Image>().await?;
        self.hydrate(images).await
    }

    pub async fn get_by_id(&self, id: Id) -> Result<ImageDto> {
        let image = self.registry.get::<Image>(id).await?;
        self.hydrate(vec![image])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("Image", id))
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<ImageDto>> {
        let images = self
            .registry
            .search::<Image>(keyword, self.settings.max_search_results)
            .await?;
        self.hydrate(images).await
    }

    pub async fn create(&self, input: &CreateUpdateImage) -> Result<ImageDto> {
        let links = input.check()?;
        ensure_exist::<Element>(&self.registry, &links.element_ids).await?;
        ensure_exist::<ElementValue>(&self.registry, &links.element_value_ids).await?;

        let mut image = Image::default();
        apply_input(&mut image, input);

        let mut work = self.registry.work();
        let pending = work.add(&image)?;
        stage_links(&mut work, Link::from(pending), &links)?;
        let id = self.registry.commit(work).await?.id_of(pending)?;

        tracing::info!(image_id = id, source_url = %image.source_url, "Image created");
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: Id, input: &CreateUpdateImage) -> Result<ImageDto> {
        let links = input.check()?;
        let mut image = self.registry.get::<Image>(id).await?;
        ensure_exist::<Element>(&self.registry, &links.element_ids).await?;
        ensure_exist::<ElementValue>(&self.registry, &links.element_value_ids).await?;
        apply_input(&mut image, input);

        let mut work = self.registry.work();
        work.update(&image)?;
        if !links.is_empty() {
            work.remove_where(Table::ImageElementRef, "image_id", &[id]);
            work.remove_where(Table::ImageElementValueRef, "image_id", &[id]);
            stage_links(&mut work, Link::from(id), &links)?;
        }
        if !self.registry.commit(work).await?.applied() {
            return Err(Error::not_found("Image", id));
        }

        tracing::info!(image_id = id, "Image updated");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let image = self.registry.get::<Image>(id).await?;
        let mut work = self.registry.work();
        work.remove_where(Table::ImageElementRef, "image_id", &[id]);
        work.remove_where(Table::ImageElementValueRef, "image_id", &[id]);
        work.remove(&image);
        self.registry.commit(work).await?;
        tracing::info!(image_id = id, "Image deleted");
        Ok(())
    }

    async fn hydrate(&self, images: Vec<Image>) -> Result<Vec<ImageDto>> {
        let ids: Vec<Id> = images.iter().map(|i| i.id).collect();
        let element_refs = self.registry.find_by::<ImageElementRef>("image_id", &ids).await?;
        let value_refs = self
            .registry
            .find_by::<ImageElementValueRef>("image_id", &ids)
            .await?;
        let mut element_ids = group_ids(&element_refs, |r| r.image_id, |r| r.element_id);
        let mut value_ids = group_ids(&value_refs, |r| r.image_id, |r| r.element_value_id);

        Ok(images
            .into_iter()
            .map(|image| {
                let id = image.id;
                let mut dto = ImageDto::from(image);
                dto.element_ids = element_ids.remove(&id).unwrap_or_default();
                dto.element_value_ids = value_ids.remove(&id).unwrap_or_default();
                dto
            })
            .collect())
    }
}

fn apply_input(image: &mut Image, input: &CreateUpdateImage) {
    image.source_url = input.source_url.trim().to_string();
    image.local_url = clean(&input.local_url);
    image.caption = clean(&input.caption);
    image.rights = clean(&input.rights);
}

fn stage_links(work: &mut UnitOfWork, image: Link, links: &TargetLinks) -> Result<()> {
    let owner = [("image_id", image)];
    for element_id in &links.element_ids {
        work.add_linked(
            &ImageElementRef {
                element_id: *element_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    for value_id in &links.element_value_ids {
        work.add_linked(
            &ImageElementValueRef {
                element_value_id: *value_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    Ok(())
}
