use plot_pipeline::{BoxError, Image, Renderer};
use pmf_store::PmfDataset;

/// Describes a PMF instead of drawing it, for front-ends that can only show text
///
/// The "image" is a UTF-8 line like `aDGal13bDGalf: 37 x 37 grid, 0.00 to 12.50 kcal/mol`.
#[derive(Copy, Clone, Debug, Default)]
pub struct SummaryRenderer;

impl Renderer for SummaryRenderer {
    fn render(&mut self, label: &str, dataset: &PmfDataset) -> Result<Image, BoxError> {
        let (min, max) = dataset.z_range().ok_or("the PMF has no samples to plot")?;
        let rows = dataset.rows().count();
        let columns = dataset.rows().map(<[_]>::len).max().unwrap_or_default();

        let summary = format!("{label}: {rows} x {columns} grid, {min:.2} to {max:.2} kcal/mol");
        Ok(Image::from(summary.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn summary(label: &str, pmf: &str) -> Result<String, BoxError> {
        let dataset: PmfDataset = pmf.parse()?;
        let image = SummaryRenderer.render(label, &dataset)?;
        Ok(String::from_utf8(image.into_bytes())?)
    }

    #[test]
    fn summarise_grid() {
        let pmf = indoc! {"
            -180.0 -180.0 4.2
            -180.0 0.0 1.5
            -180.0 180.0 4.0
            0.0 -180.0 3.25
            0.0 0.0 0.0
            0.0 180.0 12.5
        "};
        assert_eq!(
            summary("aDGal13bDGalf", pmf).unwrap(),
            "aDGal13bDGalf: 2 x 3 grid, 0.00 to 12.50 kcal/mol"
        );
    }

    #[test]
    fn empty_dataset() {
        let error = summary("aDGal13bDGalf", "# nothing here\n").unwrap_err();
        assert_eq!(error.to_string(), "the PMF has no samples to plot");
    }
}
