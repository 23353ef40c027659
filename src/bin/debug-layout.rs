/// Diagnostic tool to verify fetch → tree → stats → layout pipeline
use retmap::fetch::ApiItem;
use retmap::layout::{compute_layout, LayoutConfig};
use retmap::options::DisplayOptions;
use retmap::tree::{self, aggregate};
use std::path::PathBuf;

const SAMPLE_DATASET: &str = r#"[
    {"group":["Math"]},
    {"time":1700000000,"difficulty":6.0,"stability":12.0,"decay":0.5,
     "front":"<p>quadratic formula</p>","back":"<p>$x = \\frac{1}{2}$</p>"},
    {"group":["Math","Algebra"]},
    {"cid":1,"time":1700000000,"difficulty":4.0,"stability":3.0,"decay":0.5,
     "front":"<p>factoring</p>","back":"<p>ok</p>"},
    {"cid":2,"time":1700100000,"difficulty":8.0,"stability":40.0,"decay":0.4,
     "front":"<p>binomials</p>","back":"<p>ok</p>"},
    {"group":["History"]},
    {"cid":3,"time":1700200000,"difficulty":5.0,"stability":0.0,"decay":0.5,
     "front":"<p>treaty dates</p>","back":"<p>ok</p>","paused":true}
]"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("retmap=debug".parse()?),
        )
        .init();

    println!("=== DIAGNOSTIC: Dataset → Tree → Layout Pipeline ===");

    // Load items from a JSON file argument, or fall back to the sample
    let items: Vec<ApiItem> = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            println!("Loading: {}", path.display());
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        }
        None => {
            println!("Loading: built-in sample dataset");
            serde_json::from_str(SAMPLE_DATASET)?
        }
    };
    println!("\n[1] Dataset loaded: {} items", items.len());

    // Build tree
    let tree = tree::build_tree(&items);
    println!("\n[2] Tree built: {} nodes", tree.len());

    // Aggregate statistics
    let options = DisplayOptions::default();
    let stats = aggregate::aggregate(&tree, &options)?;
    let root_stat = stats.get(tree.root);
    println!(
        "\n[3] Stats aggregated: root weight={:.2}, value={:.4}, cards={}",
        root_stat.weight, root_stat.value, root_stat.cards
    );

    // Show root children
    println!("\n[4] Children of root:");
    for (i, child_id) in tree.children(tree.root).enumerate() {
        let child = tree.get(child_id);
        let stat = stats.get(child_id);
        println!(
            "    [{}] '{}' - weight={:.2}, value={:.4}, cards={}",
            i, child.name, stat.weight, stat.value, stat.cards
        );
    }

    // Compute layout
    let config = LayoutConfig::default();
    let layout = compute_layout(&tree, &stats, tree.root, 1920.0, 1080.0, &config);
    println!(
        "\n[5] Layout computed: {} rectangles, {} borders",
        layout.rects.len(),
        layout.borders.len()
    );

    // Show top 10 largest rectangles
    println!("\n[6] Top 10 largest rectangles by area:");
    let mut sorted_rects = layout.rects.clone();
    sorted_rects.sort_by(|a, b| (b.w * b.h).total_cmp(&(a.w * a.h)));

    for (i, rect) in sorted_rects.iter().take(10).enumerate() {
        let node = tree.get(rect.node);
        let label = if node.is_group() {
            format!("group '{}'", node.name)
        } else {
            format!("card #{}", rect.node.index())
        };
        println!(
            "    [{}] {} - rect: {:.1}x{:.1} ({:.0}px²) at ({:.1}, {:.1}) depth={} value={:.4}",
            i,
            label,
            rect.w,
            rect.h,
            rect.w * rect.h,
            rect.x,
            rect.y,
            rect.depth,
            rect.value
        );
    }

    // Check coverage: card rects should tile the viewport when weight > 0
    println!("\n[7] Checking coverage:");
    let viewport_area = 1920.0f32 * 1080.0;
    let card_area: f32 = layout
        .rects
        .iter()
        .filter(|r| !tree.get(r.node).is_group())
        .map(|r| r.w * r.h)
        .sum();
    println!("    Card rect area: {:.0}px²", card_area);
    println!("    Viewport area:  {:.0}px²", viewport_area);
    println!("    Coverage: {:.1}%", (card_area / viewport_area) * 100.0);

    Ok(())
}
