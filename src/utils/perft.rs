use crate::Board;

/// Counts the leaf nodes of the legal move tree to `depth`.
pub fn perft(board: &mut Board, depth: usize) -> usize {
    let move_list = board.legal_moves();

    if depth == 1 {
        return move_list.len();
    }

    let mut nodes = 0;

    for move_ in move_list.iter() {
        board.make_move(*move_);
        nodes += perft(board, depth - 1);
        board.undo_move(*move_);
    }

    nodes
}

/// Runs a perft and prints the node count per root move.
pub fn perft_test(board: &mut Board, depth: usize) {
    use std::time::Instant;

    let move_list = board.legal_moves();

    if depth == 1 {
        println!("Total nodes: {}", move_list.len());
        return;
    }

    println!("=============== PERFT TEST ===============");
    println!("                 Depth: {depth}           ");
    println!("==========================================");

    let mut total_nodes = 0;

    let start = Instant::now();

    for move_ in move_list.iter() {
        board.make_move(*move_);
        let nodes = perft(board, depth - 1);
        total_nodes += nodes;
        board.undo_move(*move_);

        println!("              {move_}: {nodes:?}");
    }

    let time = start.elapsed().as_millis();

    println!("=========================================");
    println!("              Nodes: {total_nodes}       ");
    println!("              Time: {time}ms             ");
    println!(
        "              Mnps: {:0.1}Mnps",
        (total_nodes as f64 / time as f64 / 1000.0)
    );
    println!("=========================================");
}
