use serde::de::DeserializeOwned;

use super::datasets::{Charity, Job, Mission, School};

/// Linked image and heading at the top of a block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub title: String,
    pub link: String,
    pub image: String,
}

/// One `content-general` group: an optional header followed by paragraphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentBlock {
    pub header: Option<BlockHeader>,
    pub lines: Vec<String>,
}

/// Somewhere blocks can be appended to. The DOM mount points implement this,
/// and so does a plain `Vec` for anything that wants to inspect the output.
pub trait Container {
    fn append(&mut self, block: ContentBlock);
}

impl Container for Vec<ContentBlock> {
    fn append(&mut self, block: ContentBlock) {
        self.push(block);
    }
}

/// Builds one block with a linked image, a heading and a paragraph per line,
/// then appends it to `container`.
pub fn render<C, I, L>(container: &mut C, title: &str, link: &str, image: &str, lines: I)
where
    C: Container + ?Sized,
    I: IntoIterator<Item = L>,
    L: Into<String>,
{
    container.append(ContentBlock {
        header: Some(BlockHeader {
            title: title.to_string(),
            link: link.to_string(),
            image: image.to_string(),
        }),
        lines: lines.into_iter().map(Into::into).collect(),
    });
}

pub fn load_mission<C: Container + ?Sized>(container: &mut C, mission: &Mission) {
    container.append(ContentBlock {
        header: None,
        lines: vec![mission.text.clone()],
    });
}

pub fn load_education<C: Container + ?Sized>(container: &mut C, schools: &[School]) {
    for school in schools {
        let line = format!("{} | {}", school.degree, school.attended);
        render(container, &school.name, &school.link, &school.image, [line]);
    }
}

pub fn load_jobs<C: Container + ?Sized>(container: &mut C, jobs: &[Job]) {
    for job in jobs {
        let headline = format!("{} | {}", job.role, job.attended);
        render(
            container,
            &job.company,
            &job.link,
            &job.image,
            [headline, job.description.clone(), job.experience_gained.clone()],
        );
    }
}

pub fn load_charities<C: Container + ?Sized>(container: &mut C, charities: &[Charity]) {
    for charity in charities {
        render(
            container,
            &charity.name,
            &charity.link,
            &charity.image,
            [charity.description.as_str(), charity.contribution.as_str()],
        );
    }
}

/// A decoded dataset document that knows how to lay itself out.
pub trait Section: DeserializeOwned {
    fn render_into(&self, container: &mut dyn Container);
}

impl Section for Mission {
    fn render_into(&self, container: &mut dyn Container) {
        load_mission(container, self);
    }
}

impl Section for Vec<School> {
    fn render_into(&self, container: &mut dyn Container) {
        load_education(container, self);
    }
}

impl Section for Vec<Job> {
    fn render_into(&self, container: &mut dyn Container) {
        load_jobs(container, self);
    }
}

impl Section for Vec<Charity> {
    fn render_into(&self, container: &mut dyn Container) {
        load_charities(container, self);
    }
}
