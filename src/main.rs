use std::{fs, iter, path::PathBuf};

use clap::Parser;
use glycan::{DihedralSelector, DihedralTable, builder};
use glycoplot::{GlycoplotError, Molecule, Result, Settings, SummaryRenderer};
use itertools::Itertools;
use log::warn;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, IntoDiagnostic};
use plot_pipeline::PlotPipeline;
use pmf_store::{Point, Points, Store};
use rustyline::DefaultEditor;

const HELP: &str = "\
<sequence>            parse a glycan, like aDGal(1->3)bDGalf(1->2)aDMan, and plot its connections
:pick <plot> <x> <y>  pick a point on a plot, in pixels
:clear                forget every picked point
:save <name>          save the molecule and its picked points
:load <name>          load a saved molecule and its picked points
:configs              list the saved configurations
:builder              show the structure builder's dihedral input
:report <file>        show the final angles from a structure builder report
:help                 show this message
";

/// Explore glycan PMFs and pick dihedral angles for the structure builder
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The settings file to read, if it exists
    #[arg(long, default_value = Settings::FILE_NAME)]
    settings: PathBuf,

    /// Use this PMF database instead of the one in the settings
    #[arg(long)]
    database: Option<PathBuf>,

    /// Use this dihedral table instead of the one in the settings
    #[arg(long)]
    dihedrals: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load_or_default(&args.settings)?;
    settings.database = args.database.unwrap_or(settings.database);
    settings.dihedral_table = args.dihedrals.unwrap_or(settings.dihedral_table);

    let dihedrals = DihedralTable::from_path(&settings.dihedral_table).unwrap_or_else(|e| {
        render_error(e);
        DihedralTable::default()
    });
    let mut session = Session::new(settings, dihedrals)?;

    let mut rl = DefaultEditor::new().into_diagnostic()?;
    while let Ok(line) = rl.readline("Glycan: ") {
        if let Err(e) = rl.add_history_entry(&line) {
            warn!("failed to record history: {e}");
        }
        match session.run(&line) {
            Ok(output) => print!("{output}"),
            Err(diagnostic) => render_error(diagnostic),
        }
    }
    Ok(())
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    let diagnostic = diagnostic.into();
    if GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.as_ref())
        .is_err()
    {
        buf = diagnostic.to_string();
    }
    println!("{buf}");
}

// Commands ============================================================================================================

#[derive(Clone, PartialEq, Debug)]
enum Command<'a> {
    Molecule(&'a str),
    Pick { plot: usize, x: f64, y: f64 },
    Clear,
    Save(&'a str),
    Load(&'a str),
    Configs,
    Builder,
    Report(&'a str),
    Help,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Result<Option<Self>> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok((!line.is_empty()).then_some(Self::Molecule(line)));
        };

        let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        let rest = rest.trim();
        let name_argument = |usage| {
            if rest.is_empty() {
                Err(GlycoplotError::Usage(usage))
            } else {
                Ok(rest)
            }
        };

        let command = match name {
            "pick" => {
                let usage = GlycoplotError::Usage(":pick <plot> <x> <y>");
                let Some((plot, x, y)) = rest.split_whitespace().collect_tuple() else {
                    return Err(usage);
                };
                match (plot.parse::<usize>(), x.parse::<f64>(), y.parse::<f64>()) {
                    (Ok(plot), Ok(x), Ok(y)) => Self::Pick { plot, x, y },
                    _ => return Err(usage),
                }
            }
            "clear" => Self::Clear,
            "save" => Self::Save(name_argument(":save <name>")?),
            "load" => Self::Load(name_argument(":load <name>")?),
            "configs" => Self::Configs,
            "builder" => Self::Builder,
            "report" => Self::Report(name_argument(":report <file>")?),
            "help" => Self::Help,
            _ => return Err(GlycoplotError::UnknownCommand(name.to_owned())),
        };
        Ok(Some(command))
    }
}

// Session =============================================================================================================

#[derive(Debug)]
struct Session {
    settings: Settings,
    dihedrals: DihedralTable,
    store: Store,
    molecule: Option<Molecule>,
    points: Points,
}

impl Session {
    fn new(settings: Settings, dihedrals: DihedralTable) -> Result<Self> {
        let store = Store::open(&settings.database)?;
        Ok(Self {
            settings,
            dihedrals,
            store,
            molecule: None,
            points: Points::new(),
        })
    }

    fn run(&mut self, line: &str) -> Result<String> {
        let Some(command) = Command::parse(line)? else {
            return Ok(String::new());
        };

        match command {
            Command::Molecule(notation) => {
                self.molecule = Some(Molecule::parse(notation)?);
                self.points.clear();
                self.describe()
            }
            Command::Pick { plot, x, y } => self.pick(plot, x, y),
            Command::Clear => {
                self.points.clear();
                Ok("Cleared every picked point\n".to_owned())
            }
            Command::Save(name) => {
                let molecule = self.molecule()?;
                molecule.save(&self.store, name, &self.points)?;
                Ok(format!("Saved configuration {name:?} for {}\n", molecule.notation()))
            }
            Command::Load(name) => {
                let (molecule, points) = Molecule::load(&self.store, name)?
                    .ok_or_else(|| GlycoplotError::UnknownConfiguration(name.to_owned()))?;
                self.molecule = Some(molecule);
                self.points = points;
                self.describe()
            }
            Command::Configs => {
                let ids = self.store.list_configuration_ids()?;
                Ok(ids.iter().map(|id| format!("{id}\n")).collect())
            }
            Command::Builder => {
                let selector = DihedralSelector::new(&self.dihedrals);
                Ok(self.molecule()?.builder_input(selector, &self.points))
            }
            Command::Report(path) => report(path),
            Command::Help => Ok(HELP.to_owned()),
        }
    }

    fn molecule(&self) -> Result<&Molecule> {
        self.molecule.as_ref().ok_or(GlycoplotError::NoMolecule)
    }

    fn pick(&mut self, plot: usize, x: f64, y: f64) -> Result<String> {
        let connections = self.molecule()?.connections();
        let connection = connections
            .get(plot)
            .ok_or(GlycoplotError::UnknownConnection {
                index: plot,
                count: connections.len(),
            })?
            .to_string();

        let message = match builder::pixel_to_angles((x, y)) {
            Some((phi, psi)) => format!("Picked phi {phi:.1}, psi {psi:.1} on {connection}\n"),
            None => format!("({x}, {y}) is off the plot for {connection} and won't be used\n"),
        };
        self.points.entry(connection).or_default().push(Point::new(x, y));
        Ok(message)
    }

    fn describe(&self) -> Result<String> {
        let molecule = self.molecule()?;
        let sequence = molecule.sequence();
        let connections = molecule.connections();
        let candidates = molecule.candidates(DihedralSelector::new(&self.dihedrals));

        let mut plots: Vec<_> = iter::repeat_with(String::new).take(connections.len()).collect();
        let stream = PlotPipeline::new(&self.settings.database, SummaryRenderer)
            .render_all(connections.iter().cloned())
            .map_err(GlycoplotError::Worker)?;
        // NOTE: Results are keyed by index, so the order they arrive in doesn't matter
        for outcome in stream {
            match outcome {
                Ok(plot) => {
                    plots[plot.index] = String::from_utf8_lossy(plot.image.bytes()).into_owned();
                }
                Err(failure) => plots[failure.index] = format!("no plot: {}", failure.error),
            }
        }

        let mut lines = vec![
            format!("Residues: {}", sequence.residues().iter().join(", ")),
            format!("Linkages: {}", sequence.linkages().iter().join(", ")),
            "Connections:".to_owned(),
        ];
        let rows = connections.iter().zip(plots).zip(candidates);
        for (index, ((connection, plot), definitions)) in rows.enumerate() {
            lines.push(format!("  [{index}] {connection}"));
            lines.push(format!("      {plot}"));
            if definitions.is_empty() {
                lines.push("      no dihedral definitions".to_owned());
            }
            lines.extend(definitions.iter().map(|definition| format!("      {definition}")));
            let picked = self.points.get(connection.as_str()).into_iter().flatten();
            lines.extend(picked.map(|point| format!("      picked ({}, {})", point.x, point.y)));
        }
        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

fn report(path: &str) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|source| GlycoplotError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    if !builder::build_succeeded(&text) {
        return Ok("The build was unsuccessful, try different angles\n".to_owned());
    }

    let linkages = builder::final_linkages(&text);
    if linkages.is_empty() {
        return Ok("The structure was built, but no final angles were reported\n".to_owned());
    }
    Ok(linkages.iter().map(|linkage| format!("{linkage}\n")).collect())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pmf_store::Coordinate;
    use tempfile::{TempDir, tempdir};

    use super::*;

    const TABLE: &str = indoc! {"
        aDGal 1 3 bDGalf,phi psi,H1-C1-O3-C3,C1-O3-C3-H3
        bDGalf 1 2 aDMan,phi psi,H1-C1-O2-C2,C1-O2-C2-H2
    "};

    fn session() -> (TempDir, Session) {
        let dir = tempdir().unwrap();
        let settings = Settings {
            database: dir.path().join("pmf.db"),
            ..Settings::default()
        };
        let store = Store::open(&settings.database).unwrap();
        let samples = [
            (-180.0, -180.0, 4.2),
            (-180.0, 0.0, 1.5),
            (0.0, -180.0, 0.0),
            (0.0, 0.0, 2.0),
        ];
        let dataset = samples
            .into_iter()
            .map(Coordinate::from)
            .collect();
        store.insert_dataset("aDGal13bDGalf", &dataset).unwrap();

        let session = Session::new(settings, DihedralTable::new(TABLE)).unwrap();
        (dir, session)
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse(" aDGal(1->3)bDGalf ").unwrap(),
            Some(Command::Molecule("aDGal(1->3)bDGalf"))
        );
        assert_eq!(
            Command::parse(":pick 1 120 45.5").unwrap(),
            Some(Command::Pick {
                plot: 1,
                x: 120.0,
                y: 45.5
            })
        );
        assert_eq!(
            Command::parse(":save  my draft ").unwrap(),
            Some(Command::Save("my draft"))
        );
        assert_eq!(Command::parse(":configs").unwrap(), Some(Command::Configs));

        assert!(matches!(Command::parse(":pick 1 120"), Err(GlycoplotError::Usage(_))));
        assert!(matches!(Command::parse(":pick a b c"), Err(GlycoplotError::Usage(_))));
        assert!(matches!(Command::parse(":load"), Err(GlycoplotError::Usage(_))));
        assert!(matches!(
            Command::parse(":plot 1"),
            Err(GlycoplotError::UnknownCommand(name)) if name == "plot"
        ));
    }

    #[test]
    fn describe_molecule() {
        let (_dir, mut session) = session();
        let output = session.run("aDGal(1->3)bDGalf(1->2)aDMan").unwrap();
        assert_eq!(
            output,
            indoc! {"
                Residues: aDGal, bDGalf, aDMan
                Linkages: 1->3, 1->2
                Connections:
                  [0] aDGal13bDGalf
                      aDGal13bDGalf: 2 x 2 grid, 0.00 to 4.20 kcal/mol
                      phi psi: aDGal 1 3 bDGalf
                  [1] bDGalf12aDMan
                      no plot: no PMF data has been stored for bDGalf12aDMan
                      phi psi: bDGalf 1 2 aDMan
            "}
        );
    }

    #[test]
    fn pick_save_and_load() {
        let (_dir, mut session) = session();
        assert!(matches!(session.run(":pick 0 150 3"), Err(GlycoplotError::NoMolecule)));

        session.run("aDGal(1->3)bDGalf(1->2)aDMan").unwrap();
        assert_eq!(
            session.run(":pick 0 150 3").unwrap(),
            "Picked phi -0.0, psi 180.0 on aDGal13bDGalf\n"
        );
        assert!(session.run(":pick 1 0 0").unwrap().contains("won't be used"));
        assert!(matches!(
            session.run(":pick 2 150 150"),
            Err(GlycoplotError::UnknownConnection { index: 2, count: 2 })
        ));
        assert_eq!(
            session.run(":builder").unwrap(),
            "aDGal 1 3 bDGalf,phi psi,-0.0 180.0\nbDGalf 1 2 aDMan,phi psi\n"
        );

        session.run(":save draft").unwrap();
        session.run("aLFuc(1->3)bDGalNAc").unwrap();
        assert_eq!(session.run(":builder").unwrap(), "");

        let loaded = session.run(":load draft").unwrap();
        assert!(loaded.contains("picked (150, 3)"));
        assert_eq!(session.run(":configs").unwrap(), "draft\n");
        assert!(matches!(
            session.run(":load missing"),
            Err(GlycoplotError::UnknownConfiguration(_))
        ));
    }

    #[test]
    fn builder_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.txt");
        fs::write(
            &path,
            indoc! {"
                FINAL linkage: aDGal#1 1 3 bDGalf#2 : -71.2 102.9
                PDB file Built
            "},
        )
        .unwrap();
        let path = path.to_string_lossy();
        assert_eq!(
            report(&path).unwrap(),
            "Linkage: aDGal 1 3 bDGalf, Angles: -71.2 102.9\n"
        );

        fs::write(dir.path().join("failed.txt"), "ERROR: clash\n").unwrap();
        let failed = dir.path().join("failed.txt");
        assert!(report(&failed.to_string_lossy()).unwrap().contains("unsuccessful"));
        assert!(matches!(report("no/such/report.txt"), Err(GlycoplotError::Io { .. })));
    }
}
